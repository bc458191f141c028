use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub data: DataSection,
    #[serde(default)]
    pub output: OutputSection,
    #[serde(default)]
    pub filters: FilterDefaults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSection {
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputSection {
    pub dir: String,
}

/// Defaults for the dashboard controls; the interaction layer overrides them
/// per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterDefaults {
    /// How many products the top-N views show.
    pub top_products: i64,
    pub from_month: u32,
    pub to_month: u32,
    /// Sample size of the reorder-point adequacy scatter.
    pub reorder_sample: i64,
}

impl Default for DataSection {
    fn default() -> Self {
        DataSection {
            path: "data/supply_chain_dataset.csv".to_string(),
        }
    }
}

impl Default for OutputSection {
    fn default() -> Self {
        OutputSection {
            dir: "reports".to_string(),
        }
    }
}

impl Default for FilterDefaults {
    fn default() -> Self {
        FilterDefaults {
            top_products: 10,
            from_month: 1,
            to_month: 12,
            reorder_sample: 200,
        }
    }
}

impl Default for DashboardConfig {
    fn default() -> Self {
        DashboardConfig {
            data: DataSection::default(),
            output: OutputSection::default(),
            filters: FilterDefaults::default(),
        }
    }
}

impl DashboardConfig {
    pub fn from_file(path: &str) -> Result<Self, anyhow::Error> {
        let content = std::fs::read_to_string(path)?;
        let config: DashboardConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Built-in defaults when the config file does not exist; a file that
    /// exists but fails to parse is still a hard error.
    pub fn load_or_default(path: &str) -> Result<Self, anyhow::Error> {
        if std::path::Path::new(path).exists() {
            Self::from_file(path)
        } else {
            warn!("config file {} not found, using defaults", path);
            Ok(Self::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = DashboardConfig::default();
        assert_eq!(config.filters.top_products, 10);
        assert_eq!(config.filters.from_month, 1);
        assert_eq!(config.filters.to_month, 12);
    }

    #[test]
    fn test_partial_file_falls_back_per_section() {
        let config: DashboardConfig = toml::from_str(
            r#"
            [data]
            path = "somewhere/else.csv"
            "#,
        )
        .unwrap();
        assert_eq!(config.data.path, "somewhere/else.csv");
        assert_eq!(config.output.dir, "reports");
        assert_eq!(config.filters.reorder_sample, 200);
    }
}
