use anyhow::{Context, Result};
use std::env;
use tracing::info;

use supply_dashboard::config::DashboardConfig;
use supply_dashboard::loader::load_table;
use supply_dashboard::pipeline::record_filter::RecordFilter;
use supply_dashboard::state::AppState;
use supply_dashboard::storage::ReportWriter;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let config_path = env::args()
        .nth(1)
        .unwrap_or_else(|| "configs/dashboard.toml".to_string());
    let config = DashboardConfig::load_or_default(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path))?;

    info!("🚀 Starting supply-chain dashboard pipeline");
    info!("Loading dataset from {}", config.data.path);

    let (table, report) = load_table(&config.data.path)
        .with_context(|| format!("failed to load dataset from {}", config.data.path))?;
    info!(
        "Canonical table ready: {} records ({} read, {} dropped for schema errors, {} invalid dates, {} duplicates)",
        table.len(),
        report.rows_read,
        report.schema_errors,
        report.invalid_dates,
        report.duplicates,
    );

    let state = AppState::new(config, table);
    let writer = ReportWriter::new(&state.config.output.dir);
    let everything = RecordFilter::default();

    writer.write("forecast", &state.forecast(&everything))?;
    writer.write("promotions", &state.promotions(&everything))?;
    writer.write("suppliers", &state.suppliers(&everything))?;
    writer.write("inventory", &state.inventory(&everything))?;
    writer.write("demand", &state.demand(&everything))?;

    info!("✅ Wrote 5 reports to {}", state.config.output.dir);
    Ok(())
}
