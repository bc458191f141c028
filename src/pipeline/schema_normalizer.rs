use chrono::NaiveDate;
use thiserror::Error;

use crate::models::{NormalizedRecord, RawRow};

/// Schema violations in the raw input.
///
/// `MissingColumn` is fatal for the whole load; the identifier variants are
/// fatal only for the affected row, which the loader drops with a warning.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("required column `{0}` is missing from the input header")]
    MissingColumn(String),
    #[error("column `{column}`: identifier `{value}` does not match prefix `{prefix}`")]
    InvalidIdentifier {
        column: &'static str,
        prefix: &'static str,
        value: String,
    },
    #[error("column `{column}`: identifier cell is empty")]
    MissingIdentifier { column: &'static str },
}

/// Canonical form of a raw column header: trimmed, lower-cased, spaces
/// replaced with underscores, and the product identifier column renamed from
/// `sku_id` to `product_id`. Applying it twice yields the same name.
pub fn canonical_column(name: &str) -> String {
    let canonical = name.trim().to_lowercase().replace(' ', "_");
    if canonical == "sku_id" {
        "product_id".to_string()
    } else {
        canonical
    }
}

/// Parse a prefixed identifier like `SKU_7` into its integer part.
pub fn parse_identifier(
    column: &'static str,
    prefix: &'static str,
    value: Option<&str>,
) -> Result<u32, SchemaError> {
    let value = value.ok_or(SchemaError::MissingIdentifier { column })?;
    value
        .trim()
        .strip_prefix(prefix)
        .and_then(|rest| rest.parse::<u32>().ok())
        .ok_or_else(|| SchemaError::InvalidIdentifier {
            column,
            prefix,
            value: value.to_string(),
        })
}

/// Parse a calendar date, trying day-first formats before ISO.
///
/// An unparseable value is the `None` sentinel, not an error; the cleaner
/// removes such rows.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    for format in ["%d/%m/%Y", "%d-%m-%Y", "%d.%m.%Y", "%Y-%m-%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(value, format) {
            return Some(date);
        }
    }
    None
}

/// Parse a numeric cell. Anything that is not a finite number is missing.
pub fn parse_number(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|v| v.is_finite())
}

/// Parse the 0/1 promotion flag. Any other content is missing.
pub fn parse_flag(value: Option<&str>) -> Option<bool> {
    match value.map(str::trim) {
        Some("1") => Some(true),
        Some("0") => Some(false),
        _ => None,
    }
}

/// Turns raw string rows into typed records: strips the `SKU_`/`WH_`/`SUP_`
/// identifier prefixes, coerces dates and numbers, and leaves cleaning
/// (deduplication, dropping the invalid-date sentinel) to the record cleaner.
pub struct SchemaNormalizer;

impl SchemaNormalizer {
    pub fn normalize_row(&self, raw: &RawRow) -> Result<NormalizedRecord, SchemaError> {
        let product_id = parse_identifier("product_id", "SKU_", raw.sku_id.as_deref())?;
        let warehouse_id = parse_identifier("warehouse_id", "WH_", raw.warehouse_id.as_deref())?;
        let supplier_id = parse_identifier("supplier_id", "SUP_", raw.supplier_id.as_deref())?;

        Ok(NormalizedRecord {
            date: raw.date.as_deref().and_then(parse_date),
            product_id,
            warehouse_id,
            supplier_id,
            region: raw.region.clone(),
            units_sold: parse_number(raw.units_sold.as_deref()),
            demand_forecast: parse_number(raw.demand_forecast.as_deref()),
            inventory_level: parse_number(raw.inventory_level.as_deref()),
            reorder_point: parse_number(raw.reorder_point.as_deref()),
            supplier_lead_time_days: parse_number(raw.supplier_lead_time_days.as_deref()),
            unit_price: parse_number(raw.unit_price.as_deref()),
            unit_cost: parse_number(raw.unit_cost.as_deref()),
            promotion_flag: parse_flag(raw.promotion_flag.as_deref()),
        })
    }
}
