use chrono::{Datelike, NaiveDate};

/// One data row of the input file after header canonicalization, before any
/// type coercion. Cells are kept as raw trimmed strings; empty cells are
/// `None`.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub date: Option<String>,
    pub sku_id: Option<String>,
    pub warehouse_id: Option<String>,
    pub supplier_id: Option<String>,
    pub region: Option<String>,
    pub units_sold: Option<String>,
    pub demand_forecast: Option<String>,
    pub inventory_level: Option<String>,
    pub reorder_point: Option<String>,
    pub supplier_lead_time_days: Option<String>,
    pub unit_price: Option<String>,
    pub unit_cost: Option<String>,
    pub promotion_flag: Option<String>,
}

/// A row that passed identifier parsing but has not been cleaned yet.
///
/// The date is still optional here: an unparseable date becomes `None` at the
/// normalizer and the cleaner drops the row. Numeric columns carry a typed
/// missing state; a missing value is never a marker string and never zero.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedRecord {
    pub date: Option<NaiveDate>,
    pub product_id: u32,
    pub warehouse_id: u32,
    pub supplier_id: u32,
    pub region: Option<String>,
    pub units_sold: Option<f64>,
    pub demand_forecast: Option<f64>,
    pub inventory_level: Option<f64>,
    pub reorder_point: Option<f64>,
    pub supplier_lead_time_days: Option<f64>,
    pub unit_price: Option<f64>,
    pub unit_cost: Option<f64>,
    pub promotion_flag: Option<bool>,
}

/// One row of the canonical cleaned table.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub date: NaiveDate,
    pub product_id: u32,
    pub warehouse_id: u32,
    pub supplier_id: u32,
    pub region: String,
    pub units_sold: Option<f64>,
    pub demand_forecast: Option<f64>,
    pub inventory_level: Option<f64>,
    pub reorder_point: Option<f64>,
    pub supplier_lead_time_days: Option<f64>,
    pub unit_price: Option<f64>,
    pub unit_cost: Option<f64>,
    pub promotion_flag: Option<bool>,
}

impl Record {
    /// Calendar month (1-12), always derived from the date, never stored.
    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn promotion_label(&self) -> &'static str {
        match self.promotion_flag {
            Some(true) => "Promotion",
            Some(false) => "No Promotion",
            None => "Unknown",
        }
    }
}

impl From<Record> for NormalizedRecord {
    fn from(r: Record) -> Self {
        NormalizedRecord {
            date: Some(r.date),
            product_id: r.product_id,
            warehouse_id: r.warehouse_id,
            supplier_id: r.supplier_id,
            region: Some(r.region),
            units_sold: r.units_sold,
            demand_forecast: r.demand_forecast,
            inventory_level: r.inventory_level,
            reorder_point: r.reorder_point,
            supplier_lead_time_days: r.supplier_lead_time_days,
            unit_price: r.unit_price,
            unit_cost: r.unit_cost,
            promotion_flag: r.promotion_flag,
        }
    }
}

/// The canonical in-memory dataset: an ordered collection of cleaned records.
///
/// Built once by the normalizer and cleaner at load time. The type exposes no
/// mutating operations; every downstream stage derives a new structure from
/// it, so the table can be shared read-only for the whole session.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    records: Vec<Record>,
}

impl Table {
    pub fn new(records: Vec<Record>) -> Self {
        Table { records }
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: NaiveDate, promo: Option<bool>) -> Record {
        Record {
            date,
            product_id: 1,
            warehouse_id: 1,
            supplier_id: 1,
            region: "West".to_string(),
            units_sold: Some(10.0),
            demand_forecast: Some(12.0),
            inventory_level: Some(100.0),
            reorder_point: Some(40.0),
            supplier_lead_time_days: Some(5.0),
            unit_price: Some(3.5),
            unit_cost: Some(2.0),
            promotion_flag: promo,
        }
    }

    #[test]
    fn test_month_is_derived_from_date() {
        let r = record(NaiveDate::from_ymd_opt(2024, 11, 3).unwrap(), None);
        assert_eq!(r.month(), 11);
    }

    #[test]
    fn test_promotion_labels() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert_eq!(record(d, Some(true)).promotion_label(), "Promotion");
        assert_eq!(record(d, Some(false)).promotion_label(), "No Promotion");
        assert_eq!(record(d, None).promotion_label(), "Unknown");
    }
}
