//! Supplier lead times: who delivers fast, who delivers predictably, and how
//! lead time relates to the inventory being carried.

use serde::Serialize;

use crate::models::Table;
use crate::pipeline::aggregation::{KeyColumn, Metric, Reduction, aggregate};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierLeadTime {
    pub supplier_id: u32,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    /// Population standard deviation of lead-time days.
    pub std: Option<f64>,
    pub orders: usize,
}

/// Per-supplier lead-time summary table.
pub fn lead_time_summary(table: &Table) -> Vec<SupplierLeadTime> {
    aggregate(
        table,
        &[KeyColumn::SupplierId],
        &[
            Metric::new("mean", |r| r.supplier_lead_time_days, Reduction::Mean),
            Metric::new("median", |r| r.supplier_lead_time_days, Reduction::Median),
            Metric::new("min", |r| r.supplier_lead_time_days, Reduction::Min),
            Metric::new("max", |r| r.supplier_lead_time_days, Reduction::Max),
            Metric::new("std", |r| r.supplier_lead_time_days, Reduction::Std),
        ],
    )
    .into_iter()
    .filter_map(|row| {
        Some(SupplierLeadTime {
            supplier_id: row.key.first()?.as_int()?,
            mean: row.value("mean"),
            median: row.value("median"),
            min: row.value("min"),
            max: row.value("max"),
            std: row.value("std"),
            orders: row.count,
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierInventory {
    pub supplier_id: u32,
    pub avg_lead_time: Option<f64>,
    pub avg_inventory: Option<f64>,
}

/// Scatter input: average lead time vs average inventory level per supplier.
pub fn lead_time_vs_inventory(table: &Table) -> Vec<SupplierInventory> {
    aggregate(
        table,
        &[KeyColumn::SupplierId],
        &[
            Metric::new("avg_lead_time", |r| r.supplier_lead_time_days, Reduction::Mean),
            Metric::new("avg_inventory", |r| r.inventory_level, Reduction::Mean),
        ],
    )
    .into_iter()
    .filter_map(|row| {
        Some(SupplierInventory {
            supplier_id: row.key.first()?.as_int()?,
            avg_lead_time: row.value("avg_lead_time"),
            avg_inventory: row.value("avg_inventory"),
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierReport {
    pub lead_times: Vec<SupplierLeadTime>,
    pub lead_time_vs_inventory: Vec<SupplierInventory>,
}

pub fn supplier_report(table: &Table) -> SupplierReport {
    SupplierReport {
        lead_times: lead_time_summary(table),
        lead_time_vs_inventory: lead_time_vs_inventory(table),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use chrono::NaiveDate;

    fn record(supplier_id: u32, lead_time: Option<f64>, inventory: Option<f64>) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2024, 5, 2).unwrap(),
            product_id: 1,
            warehouse_id: 1,
            supplier_id,
            region: "West".to_string(),
            units_sold: None,
            demand_forecast: None,
            inventory_level: inventory,
            reorder_point: None,
            supplier_lead_time_days: lead_time,
            unit_price: None,
            unit_cost: None,
            promotion_flag: None,
        }
    }

    #[test]
    fn test_lead_time_summary_per_supplier() {
        let table = Table::new(vec![
            record(3, Some(4.0), None),
            record(3, Some(6.0), None),
            record(1, Some(10.0), None),
        ]);
        let summary = lead_time_summary(&table);
        assert_eq!(summary.len(), 2);
        // ascending supplier ids
        assert_eq!(summary[0].supplier_id, 1);
        assert_eq!(summary[1].supplier_id, 3);

        let s3 = &summary[1];
        assert_eq!(s3.mean, Some(5.0));
        assert_eq!(s3.median, Some(5.0));
        assert_eq!(s3.min, Some(4.0));
        assert_eq!(s3.max, Some(6.0));
        assert_eq!(s3.std, Some(1.0));
        assert_eq!(s3.orders, 2);

        // single order: variability collapses to zero, not undefined
        assert_eq!(summary[0].std, Some(0.0));
    }

    #[test]
    fn test_supplier_without_lead_time_data_keeps_its_row() {
        let table = Table::new(vec![record(2, None, Some(50.0))]);
        let summary = lead_time_summary(&table);
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].mean, None);
        assert_eq!(summary[0].orders, 1);

        let scatter = lead_time_vs_inventory(&table);
        assert_eq!(scatter[0].avg_lead_time, None);
        assert_eq!(scatter[0].avg_inventory, Some(50.0));
    }
}
