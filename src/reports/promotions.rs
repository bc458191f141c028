//! Promotion impact: do promoted rows sell more, earn more, and where do
//! promotions actually run?

use serde::Serialize;

use crate::models::Table;
use crate::pipeline::aggregation::{KeyColumn, Metric, Reduction, aggregate};
use crate::pipeline::derived_fields;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionImpact {
    pub promotion: String,
    pub avg_units_sold: Option<f64>,
    pub avg_profit: Option<f64>,
    pub records: usize,
}

/// Average units sold and average profit per promotion label.
pub fn promotion_impact(table: &Table) -> Vec<PromotionImpact> {
    aggregate(
        table,
        &[KeyColumn::Promotion],
        &[
            Metric::new("avg_units_sold", |r| r.units_sold, Reduction::Mean),
            Metric::new("avg_profit", derived_fields::profit, Reduction::Mean),
        ],
    )
    .into_iter()
    .filter_map(|row| {
        Some(PromotionImpact {
            promotion: row.key.first()?.as_name()?.to_string(),
            avg_units_sold: row.value("avg_units_sold"),
            avg_profit: row.value("avg_profit"),
            records: row.count,
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionPromotions {
    pub region: String,
    pub promotion_count: usize,
}

/// Number of promoted records per region. Regions without a single promoted
/// record do not appear, matching the count-of-promotions semantics.
pub fn promotions_by_region(table: &Table) -> Vec<RegionPromotions> {
    let promoted = Table::new(
        table
            .iter()
            .filter(|r| r.promotion_flag == Some(true))
            .cloned()
            .collect(),
    );
    aggregate(&promoted, &[KeyColumn::Region], &[])
        .into_iter()
        .filter_map(|row| {
            Some(RegionPromotions {
                region: row.key.first()?.as_name()?.to_string(),
                promotion_count: row.count,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PromotionReport {
    pub impact: Vec<PromotionImpact>,
    pub by_region: Vec<RegionPromotions>,
}

pub fn promotion_report(table: &Table) -> PromotionReport {
    PromotionReport {
        impact: promotion_impact(table),
        by_region: promotions_by_region(table),
    }
}
