use std::collections::HashMap;
use std::io::Read;

use thiserror::Error;
use tracing::{info, warn};

use crate::models::{RawRow, Table};
use crate::pipeline::record_cleaner::RecordCleaner;
use crate::pipeline::schema_normalizer::{SchemaError, SchemaNormalizer, canonical_column};

/// Canonical names of the columns the pipeline requires. The raw header may
/// use any casing/spacing; a header missing one of these after
/// canonicalization is a fatal load error.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "date",
    "product_id",
    "warehouse_id",
    "supplier_id",
    "region",
    "units_sold",
    "demand_forecast",
    "inventory_level",
    "reorder_point",
    "supplier_lead_time_days",
    "unit_price",
    "unit_cost",
    "promotion_flag",
];

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read input: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Schema(#[from] SchemaError),
}

/// Summary of what happened while loading and cleaning the input file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub rows_read: usize,
    pub schema_errors: usize,
    pub invalid_dates: usize,
    pub duplicates: usize,
    pub regions_filled: usize,
}

/// Load, normalize and clean the delimited file at `path`.
pub fn load_table(path: &str) -> Result<(Table, LoadReport), LoadError> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_path(path)?;
    load_from_csv(reader)
}

/// Same pipeline over any reader, so tests can feed in-memory CSV bytes.
pub fn load_from_reader<R: Read>(input: R) -> Result<(Table, LoadReport), LoadError> {
    let reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    load_from_csv(reader)
}

struct ColumnIndex {
    date: usize,
    product_id: usize,
    warehouse_id: usize,
    supplier_id: usize,
    region: usize,
    units_sold: usize,
    demand_forecast: usize,
    inventory_level: usize,
    reorder_point: usize,
    supplier_lead_time_days: usize,
    unit_price: usize,
    unit_cost: usize,
    promotion_flag: usize,
}

impl ColumnIndex {
    fn resolve(header: &csv::StringRecord) -> Result<Self, SchemaError> {
        let mut positions: HashMap<String, usize> = HashMap::new();
        for (i, name) in header.iter().enumerate() {
            // first occurrence wins if a header repeats
            positions.entry(canonical_column(name)).or_insert(i);
        }
        let find = |name: &str| -> Result<usize, SchemaError> {
            positions
                .get(name)
                .copied()
                .ok_or_else(|| SchemaError::MissingColumn(name.to_string()))
        };
        Ok(ColumnIndex {
            date: find("date")?,
            product_id: find("product_id")?,
            warehouse_id: find("warehouse_id")?,
            supplier_id: find("supplier_id")?,
            region: find("region")?,
            units_sold: find("units_sold")?,
            demand_forecast: find("demand_forecast")?,
            inventory_level: find("inventory_level")?,
            reorder_point: find("reorder_point")?,
            supplier_lead_time_days: find("supplier_lead_time_days")?,
            unit_price: find("unit_price")?,
            unit_cost: find("unit_cost")?,
            promotion_flag: find("promotion_flag")?,
        })
    }

    fn raw_row(&self, record: &csv::StringRecord) -> RawRow {
        let cell = |idx: usize| {
            record
                .get(idx)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };
        RawRow {
            date: cell(self.date),
            sku_id: cell(self.product_id),
            warehouse_id: cell(self.warehouse_id),
            supplier_id: cell(self.supplier_id),
            region: cell(self.region),
            units_sold: cell(self.units_sold),
            demand_forecast: cell(self.demand_forecast),
            inventory_level: cell(self.inventory_level),
            reorder_point: cell(self.reorder_point),
            supplier_lead_time_days: cell(self.supplier_lead_time_days),
            unit_price: cell(self.unit_price),
            unit_cost: cell(self.unit_cost),
            promotion_flag: cell(self.promotion_flag),
        }
    }
}

fn load_from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<(Table, LoadReport), LoadError> {
    let columns = ColumnIndex::resolve(reader.headers()?)?;
    let normalizer = SchemaNormalizer;

    let mut report = LoadReport::default();
    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result?;
        report.rows_read += 1;
        match normalizer.normalize_row(&columns.raw_row(&record)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                report.schema_errors += 1;
                warn!("dropping row {}: {}", report.rows_read, e);
            }
        }
    }

    let (table, clean) = RecordCleaner.clean(rows);
    report.invalid_dates = clean.invalid_dates;
    report.duplicates = clean.duplicates;
    report.regions_filled = clean.regions_filled;

    info!(
        "loaded {} of {} rows ({} schema errors, {} invalid dates, {} duplicates, {} regions filled)",
        table.len(),
        report.rows_read,
        report.schema_errors,
        report.invalid_dates,
        report.duplicates,
        report.regions_filled,
    );

    Ok((table, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const HEADER: &str = "Date,SKU_ID,Warehouse_ID,Supplier_ID,Region,Units_Sold,Demand_Forecast,Inventory_Level,Reorder_Point,Supplier_Lead_Time_Days,Unit_Price,Unit_Cost,Promotion_Flag\n";

    fn load(csv: &str) -> (Table, LoadReport) {
        load_from_reader(csv.as_bytes()).unwrap()
    }

    #[test]
    fn test_loads_well_formed_rows() {
        let input = format!(
            "{HEADER}14/02/2024,SKU_7,WH_2,SUP_1,West,30,25,120,40,5,3.5,2.0,1\n"
        );
        let (table, report) = load(&input);
        assert_eq!(table.len(), 1);
        assert_eq!(report.schema_errors, 0);

        let r = &table.records()[0];
        assert_eq!(r.date, NaiveDate::from_ymd_opt(2024, 2, 14).unwrap());
        assert_eq!(r.product_id, 7);
        assert_eq!(r.warehouse_id, 2);
        assert_eq!(r.supplier_id, 1);
        assert_eq!(r.region, "West");
        assert_eq!(r.units_sold, Some(30.0));
        assert_eq!(r.promotion_flag, Some(true));
    }

    #[test]
    fn test_header_is_case_and_spacing_insensitive() {
        let input = "date,sku id,WAREHOUSE ID,supplier_id,REGION,units sold,Demand Forecast,Inventory Level,Reorder Point,Supplier Lead Time Days,Unit Price,Unit Cost,promotion flag\n\
            14/02/2024,SKU_1,WH_1,SUP_1,East,1,1,1,1,1,1,1,0\n";
        let (table, _) = load(input);
        assert_eq!(table.len(), 1);
        assert_eq!(table.records()[0].region, "East");
    }

    #[test]
    fn test_missing_required_column_is_fatal() {
        let result = load_from_reader("Date,SKU_ID,Region\n01/01/2024,SKU_1,West\n".as_bytes());
        assert!(matches!(
            result,
            Err(LoadError::Schema(SchemaError::MissingColumn(_)))
        ));
    }

    #[test]
    fn test_bad_identifier_drops_row_not_load() {
        let input = format!(
            "{HEADER}14/02/2024,SKU_7,WH_2,SUP_1,West,30,25,120,40,5,3.5,2.0,0\n\
             15/02/2024,BAD_9,WH_2,SUP_1,West,10,9,80,40,5,3.5,2.0,0\n"
        );
        let (table, report) = load(&input);
        assert_eq!(table.len(), 1);
        assert_eq!(report.rows_read, 2);
        assert_eq!(report.schema_errors, 1);
    }

    #[test]
    fn test_invalid_date_and_duplicates_are_cleaned() {
        let input = format!(
            "{HEADER}14/02/2024,SKU_7,WH_2,SUP_1,West,30,25,120,40,5,3.5,2.0,0\n\
             14/02/2024,SKU_7,WH_2,SUP_1,West,30,25,120,40,5,3.5,2.0,0\n\
             not-a-date,SKU_8,WH_2,SUP_1,West,10,9,80,40,5,3.5,2.0,0\n"
        );
        let (table, report) = load(&input);
        assert_eq!(table.len(), 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.invalid_dates, 1);
    }

    #[test]
    fn test_missing_cells_become_typed_missing() {
        let input = format!(
            "{HEADER}14/02/2024,SKU_7,WH_2,SUP_1,,,25,120,40,5,,2.0,\n"
        );
        let (table, report) = load(&input);
        let r = &table.records()[0];
        assert_eq!(r.region, "Unknown");
        assert_eq!(report.regions_filled, 1);
        assert_eq!(r.units_sold, None);
        assert_eq!(r.unit_price, None);
        assert_eq!(r.promotion_flag, None);
    }
}
