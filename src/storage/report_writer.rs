use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

/// Writes each report as a pretty-printed JSON artifact for the presentation
/// layer to pick up.
pub struct ReportWriter {
    out_dir: PathBuf,
}

impl ReportWriter {
    pub fn new<P: AsRef<Path>>(out_dir: P) -> Self {
        ReportWriter {
            out_dir: out_dir.as_ref().to_path_buf(),
        }
    }

    pub fn write<T: Serialize>(&self, name: &str, report: &T) -> Result<PathBuf> {
        fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("failed to create output dir {}", self.out_dir.display()))?;

        let path = self.out_dir.join(format!("{}.json", name));
        let json = serde_json::to_string_pretty(report)
            .with_context(|| format!("failed to serialize report {}", name))?;
        fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;

        info!("wrote report {}", path.display());
        Ok(path)
    }
}
