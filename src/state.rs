//! Explicit application state: the configuration and the canonical cleaned
//! table, built once at startup and passed by reference into every query.
//! There is no module-level dataset anywhere.

use crate::config::DashboardConfig;
use crate::models::Table;
use crate::pipeline::record_filter::RecordFilter;
use crate::reports::{
    DemandReport, ForecastReport, InventoryReport, PromotionReport, SupplierReport, demand_report,
    forecast_report, inventory_report, promotion_report, supplier_report,
};

pub struct AppState {
    pub config: DashboardConfig,
    table: Table,
}

impl AppState {
    pub fn new(config: DashboardConfig, table: Table) -> Self {
        AppState { config, table }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn forecast(&self, filter: &RecordFilter) -> ForecastReport {
        forecast_report(&self.table, filter, self.config.filters.top_products)
    }

    pub fn promotions(&self, filter: &RecordFilter) -> PromotionReport {
        promotion_report(&filter.apply(&self.table))
    }

    pub fn suppliers(&self, filter: &RecordFilter) -> SupplierReport {
        supplier_report(&filter.apply(&self.table))
    }

    pub fn inventory(&self, filter: &RecordFilter) -> InventoryReport {
        inventory_report(
            &filter.apply(&self.table),
            self.config.filters.top_products,
            self.config.filters.reorder_sample,
        )
    }

    pub fn demand(&self, filter: &RecordFilter) -> DemandReport {
        demand_report(
            &filter.apply(&self.table),
            self.config.filters.top_products,
            self.config.filters.from_month,
            self.config.filters.to_month,
        )
    }
}
