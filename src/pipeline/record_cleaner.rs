use std::collections::HashSet;

use chrono::NaiveDate;

use crate::models::{NormalizedRecord, Record, Table};

/// What the cleaner removed or filled, for load-time diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub invalid_dates: usize,
    pub duplicates: usize,
    pub regions_filled: usize,
}

/// Marker substituted for a missing categorical value. Numeric columns never
/// receive it; they keep their typed missing state instead.
pub const UNKNOWN: &str = "Unknown";

#[derive(Hash, PartialEq, Eq)]
struct DedupKey {
    date: NaiveDate,
    product_id: u32,
    warehouse_id: u32,
    supplier_id: u32,
    region: String,
    numerics: [Option<u64>; 7],
    promotion_flag: Option<bool>,
}

fn dedup_key(r: &Record) -> DedupKey {
    DedupKey {
        date: r.date,
        product_id: r.product_id,
        warehouse_id: r.warehouse_id,
        supplier_id: r.supplier_id,
        region: r.region.clone(),
        numerics: [
            r.units_sold.map(f64::to_bits),
            r.demand_forecast.map(f64::to_bits),
            r.inventory_level.map(f64::to_bits),
            r.reorder_point.map(f64::to_bits),
            r.supplier_lead_time_days.map(f64::to_bits),
            r.unit_price.map(f64::to_bits),
            r.unit_cost.map(f64::to_bits),
        ],
        promotion_flag: r.promotion_flag,
    }
}

/// Produces the canonical table: drops rows whose date is the invalid
/// sentinel, removes exact duplicates, and substitutes [`UNKNOWN`] for a
/// missing region. Cleaning an already-clean table is a no-op.
pub struct RecordCleaner;

impl RecordCleaner {
    pub fn clean(&self, rows: Vec<NormalizedRecord>) -> (Table, CleanReport) {
        let mut report = CleanReport::default();
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(rows.len());

        for row in rows {
            let Some(date) = row.date else {
                report.invalid_dates += 1;
                continue;
            };
            let region = match row.region {
                Some(region) if !region.is_empty() => region,
                _ => {
                    report.regions_filled += 1;
                    UNKNOWN.to_string()
                }
            };
            let record = Record {
                date,
                product_id: row.product_id,
                warehouse_id: row.warehouse_id,
                supplier_id: row.supplier_id,
                region,
                units_sold: row.units_sold,
                demand_forecast: row.demand_forecast,
                inventory_level: row.inventory_level,
                reorder_point: row.reorder_point,
                supplier_lead_time_days: row.supplier_lead_time_days,
                unit_price: row.unit_price,
                unit_cost: row.unit_cost,
                promotion_flag: row.promotion_flag,
            };
            if !seen.insert(dedup_key(&record)) {
                report.duplicates += 1;
                continue;
            }
            records.push(record);
        }

        (Table::new(records), report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(date: Option<NaiveDate>, product_id: u32, region: Option<&str>) -> NormalizedRecord {
        NormalizedRecord {
            date,
            product_id,
            warehouse_id: 1,
            supplier_id: 1,
            region: region.map(str::to_string),
            units_sold: Some(5.0),
            demand_forecast: Some(4.0),
            inventory_level: None,
            reorder_point: None,
            supplier_lead_time_days: Some(3.0),
            unit_price: None,
            unit_cost: None,
            promotion_flag: Some(false),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn test_drops_invalid_dates() {
        let (table, report) = RecordCleaner.clean(vec![
            row(Some(day(1)), 1, Some("West")),
            row(None, 2, Some("East")),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(report.invalid_dates, 1);
    }

    #[test]
    fn test_removes_exact_duplicates_only() {
        let (table, report) = RecordCleaner.clean(vec![
            row(Some(day(1)), 1, Some("West")),
            row(Some(day(1)), 1, Some("West")),
            // same key fields but a different measurement is not a duplicate
            NormalizedRecord {
                units_sold: Some(6.0),
                ..row(Some(day(1)), 1, Some("West"))
            },
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(report.duplicates, 1);
    }

    #[test]
    fn test_fills_missing_region_with_unknown() {
        let (table, report) = RecordCleaner.clean(vec![
            row(Some(day(1)), 1, None),
            row(Some(day(2)), 1, Some("")),
        ]);
        assert_eq!(report.regions_filled, 2);
        assert!(table.iter().all(|r| r.region == UNKNOWN));
        // numeric missing values stay typed, no marker leaks into them
        assert!(table.iter().all(|r| r.unit_price.is_none()));
    }

    #[test]
    fn test_cleaning_is_idempotent() {
        let (table, _) = RecordCleaner.clean(vec![
            row(Some(day(1)), 1, Some("West")),
            row(Some(day(1)), 1, Some("West")),
            row(Some(day(2)), 2, None),
            row(None, 3, Some("East")),
        ]);

        let again: Vec<NormalizedRecord> =
            table.iter().cloned().map(NormalizedRecord::from).collect();
        let (second, report) = RecordCleaner.clean(again);

        assert_eq!(second, table);
        assert_eq!(report, CleanReport::default());
    }
}
