//! Inventory and replenishment: is stock aligned with demand, how many weeks
//! of cover are on hand, and is the reorder point high enough to survive the
//! supplier lead time?

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Table;
use crate::pipeline::aggregation::{
    AggregateRow, KeyColumn, Metric, Reduction, aggregate, rank_aggregates,
};
use crate::pipeline::derived_fields;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventorySeriesPoint {
    pub date: NaiveDate,
    pub units_sold: f64,
    pub inventory_level: Option<f64>,
}

/// Units sold and inventory level over time for one (product, warehouse)
/// pair. A pair that matches nothing yields an empty series, not an error.
pub fn inventory_vs_sales(
    table: &Table,
    product_id: u32,
    warehouse_id: u32,
) -> Vec<InventorySeriesPoint> {
    let slice = Table::new(
        table
            .iter()
            .filter(|r| r.product_id == product_id && r.warehouse_id == warehouse_id)
            .cloned()
            .collect(),
    );
    aggregate(
        &slice,
        &[KeyColumn::Date],
        &[
            Metric::new("units_sold", |r| r.units_sold, Reduction::Sum),
            Metric::new("inventory_level", |r| r.inventory_level, Reduction::Mean),
        ],
    )
    .into_iter()
    .filter_map(|row| {
        Some(InventorySeriesPoint {
            date: row.key.first()?.as_date()?,
            units_sold: row.value("units_sold").unwrap_or(0.0),
            inventory_level: row.value("inventory_level"),
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeksOfCover {
    pub product_id: u32,
    pub warehouse_id: u32,
    pub avg_daily_sales: Option<f64>,
    pub avg_inventory: Option<f64>,
    /// `None` when average daily sales are not positive: a gap in the chart,
    /// never 0 and never infinity.
    pub weeks_of_cover: Option<f64>,
}

fn pair_key(row: &AggregateRow) -> Option<(u32, u32)> {
    Some((row.key.first()?.as_int()?, row.key.get(1)?.as_int()?))
}

/// Weeks of inventory cover per (product, warehouse) pair for the `n` pairs
/// with the highest average daily sales.
pub fn weeks_of_cover_top(table: &Table, n: i64) -> Vec<WeeksOfCover> {
    let rows = aggregate(
        table,
        &[KeyColumn::ProductId, KeyColumn::WarehouseId],
        &[
            Metric::new("avg_daily_sales", |r| r.units_sold, Reduction::Mean),
            Metric::new("avg_inventory", |r| r.inventory_level, Reduction::Mean),
        ],
    );
    rank_aggregates(rows, "avg_daily_sales", n)
        .into_iter()
        .filter_map(|row| {
            let (product_id, warehouse_id) = pair_key(&row)?;
            let avg_daily_sales = row.value("avg_daily_sales");
            let avg_inventory = row.value("avg_inventory");
            Some(WeeksOfCover {
                product_id,
                warehouse_id,
                avg_daily_sales,
                avg_inventory,
                weeks_of_cover: derived_fields::weeks_of_cover(avg_inventory, avg_daily_sales),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReorderStatus {
    /// Reorder point covers expected demand during the lead time.
    Adequate,
    /// Reorder point is below expected demand during the lead time.
    BelowDemand,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReorderCheck {
    pub product_id: u32,
    pub warehouse_id: u32,
    pub avg_daily_sales: Option<f64>,
    pub avg_lead_time: Option<f64>,
    pub reorder_point: Option<f64>,
    pub demand_during_lead_time: Option<f64>,
    /// `None` when either side of the comparison is undefined.
    pub status: Option<ReorderStatus>,
}

/// Reorder-point adequacy per (product, warehouse) pair, limited to the `n`
/// pairs with the highest average daily sales.
pub fn reorder_point_check(table: &Table, n: i64) -> Vec<ReorderCheck> {
    let rows = aggregate(
        table,
        &[KeyColumn::ProductId, KeyColumn::WarehouseId],
        &[
            Metric::new("avg_daily_sales", |r| r.units_sold, Reduction::Mean),
            Metric::new("avg_lead_time", |r| r.supplier_lead_time_days, Reduction::Mean),
            Metric::new("reorder_point", |r| r.reorder_point, Reduction::Mean),
        ],
    );
    rank_aggregates(rows, "avg_daily_sales", n)
        .into_iter()
        .filter_map(|row| {
            let (product_id, warehouse_id) = pair_key(&row)?;
            let avg_daily_sales = row.value("avg_daily_sales");
            let avg_lead_time = row.value("avg_lead_time");
            let reorder_point = row.value("reorder_point");
            let demand =
                derived_fields::demand_during_lead_time(avg_daily_sales, avg_lead_time);
            let status = match (reorder_point, demand) {
                (Some(reorder), Some(demand)) if reorder >= demand => {
                    Some(ReorderStatus::Adequate)
                }
                (Some(_), Some(_)) => Some(ReorderStatus::BelowDemand),
                _ => None,
            };
            Some(ReorderCheck {
                product_id,
                warehouse_id,
                avg_daily_sales,
                avg_lead_time,
                reorder_point,
                demand_during_lead_time: demand,
                status,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InventoryReport {
    pub weeks_of_cover: Vec<WeeksOfCover>,
    pub reorder_checks: Vec<ReorderCheck>,
}

pub fn inventory_report(table: &Table, cover_n: i64, reorder_n: i64) -> InventoryReport {
    InventoryReport {
        weeks_of_cover: weeks_of_cover_top(table, cover_n),
        reorder_checks: reorder_point_check(table, reorder_n),
    }
}
