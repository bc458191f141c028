//! Top-product demand: the best sellers, how their sales spread across
//! regions, and how demand moves month by month.

use serde::Serialize;

use crate::models::Table;
use crate::pipeline::aggregation::{KeyColumn, KeyValue, top_n};
use crate::pipeline::cross_tab::{cross_tab, month_axis, region_axis};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopProduct {
    pub product_id: u32,
    pub units_sold: f64,
}

/// The `n` products with the most units sold overall.
pub fn top_products(table: &Table, n: i64) -> Vec<TopProduct> {
    top_n(table, KeyColumn::ProductId, "units_sold", |r| r.units_sold, n)
        .into_iter()
        .filter_map(|row| {
            Some(TopProduct {
                product_id: row.key.first()?.as_int()?,
                units_sold: row.value("units_sold").unwrap_or(0.0),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalSales {
    pub product_id: u32,
    pub region: String,
    pub units_sold: f64,
}

/// Units sold per (product, region) for the selected products, dense over
/// the full region axis of `table`: a product that never sold in a region
/// still gets an explicit zero entry, so grouped bars never drop a category.
pub fn sales_by_region(table: &Table, products: &[u32]) -> Vec<RegionalSales> {
    let rows: Vec<KeyValue> = products.iter().copied().map(KeyValue::Int).collect();
    let axis = region_axis(table);
    let ct = cross_tab(table, KeyColumn::ProductId, &rows, KeyColumn::Region, &axis, |r| {
        r.units_sold
    });

    let mut out = Vec::with_capacity(ct.cell_count());
    for (ri, row) in ct.rows().iter().enumerate() {
        for (ai, axis_value) in ct.axis().iter().enumerate() {
            let (Some(product_id), Some(region)) = (row.as_int(), axis_value.as_name()) else {
                continue;
            };
            out.push(RegionalSales {
                product_id,
                region: region.to_string(),
                units_sold: ct.value_at(ri, ai),
            });
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlySales {
    pub product_id: u32,
    pub month: u32,
    pub units_sold: f64,
}

/// Units sold per (product, month) for the selected products over the month
/// range `[from, to]`, dense: every month of the range appears for every
/// product even when nothing was sold.
pub fn demand_per_month(table: &Table, products: &[u32], from: u32, to: u32) -> Vec<MonthlySales> {
    let rows: Vec<KeyValue> = products.iter().copied().map(KeyValue::Int).collect();
    let axis = month_axis(from, to);
    let ct = cross_tab(table, KeyColumn::ProductId, &rows, KeyColumn::Month, &axis, |r| {
        r.units_sold
    });

    let mut out = Vec::with_capacity(ct.cell_count());
    for (ri, row) in ct.rows().iter().enumerate() {
        for (ai, axis_value) in ct.axis().iter().enumerate() {
            let (Some(product_id), Some(month)) = (row.as_int(), axis_value.as_int()) else {
                continue;
            };
            out.push(MonthlySales {
                product_id,
                month,
                units_sold: ct.value_at(ri, ai),
            });
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DemandReport {
    pub top_products: Vec<TopProduct>,
    pub by_region: Vec<RegionalSales>,
    pub by_month: Vec<MonthlySales>,
}

pub fn demand_report(table: &Table, n: i64, from_month: u32, to_month: u32) -> DemandReport {
    let top = top_products(table, n);
    let ids: Vec<u32> = top.iter().map(|p| p.product_id).collect();
    DemandReport {
        by_region: sales_by_region(table, &ids),
        by_month: demand_per_month(table, &ids, from_month, to_month),
        top_products: top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;
    use chrono::NaiveDate;

    fn record(product_id: u32, region: &str, month: u32, sold: f64) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2024, month, 3).unwrap(),
            product_id,
            warehouse_id: 1,
            supplier_id: 1,
            region: region.to_string(),
            units_sold: Some(sold),
            demand_forecast: None,
            inventory_level: None,
            reorder_point: None,
            supplier_lead_time_days: None,
            unit_price: None,
            unit_cost: None,
            promotion_flag: None,
        }
    }

    #[test]
    fn test_top_products() {
        let table = Table::new(vec![
            record(1, "West", 1, 10.0),
            record(2, "West", 1, 30.0),
            record(1, "East", 2, 15.0),
        ]);
        let top = top_products(&table, 1);
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].product_id, 2);
        assert_eq!(top[0].units_sold, 30.0);
    }

    #[test]
    fn test_sales_by_region_is_dense() {
        let table = Table::new(vec![
            record(1, "West", 1, 10.0),
            record(1, "East", 1, 5.0),
            record(2, "West", 1, 3.0),
        ]);
        let sales = sales_by_region(&table, &[1, 2]);
        // 2 products x 2 regions
        assert_eq!(sales.len(), 4);
        let cell = |p: u32, region: &str| {
            sales
                .iter()
                .find(|s| s.product_id == p && s.region == region)
                .unwrap()
                .units_sold
        };
        assert_eq!(cell(1, "West"), 10.0);
        assert_eq!(cell(2, "East"), 0.0);
    }

    #[test]
    fn test_demand_per_month_covers_range() {
        let table = Table::new(vec![
            record(1, "West", 1, 4.0),
            record(1, "West", 3, 6.0),
            record(1, "West", 9, 100.0), // outside the requested range
        ]);
        let monthly = demand_per_month(&table, &[1], 1, 3);
        assert_eq!(monthly.len(), 3);
        assert_eq!(monthly[1].month, 2);
        assert_eq!(monthly[1].units_sold, 0.0);
        assert!(monthly.iter().all(|m| (1..=3).contains(&m.month)));
    }

    #[test]
    fn test_demand_report_on_empty_table() {
        let report = demand_report(&Table::default(), 5, 1, 12);
        assert!(report.top_products.is_empty());
        assert!(report.by_region.is_empty());
        assert!(report.by_month.is_empty());
    }
}
