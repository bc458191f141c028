//! Forecast accuracy: company-wide sales vs forecast over time, the products
//! with the largest total forecast error, and error distributions by
//! promotion status for the bias box plot.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Table;
use crate::pipeline::aggregation::{KeyColumn, Metric, Reduction, aggregate, top_n};
use crate::pipeline::derived_fields;
use crate::pipeline::record_filter::RecordFilter;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyDemand {
    pub date: NaiveDate,
    pub units_sold: f64,
    pub demand_forecast: f64,
}

/// Total units sold and total forecast per date, chronological.
pub fn sales_vs_forecast(table: &Table) -> Vec<DailyDemand> {
    let rows = aggregate(
        table,
        &[KeyColumn::Date],
        &[
            Metric::new("units_sold", |r| r.units_sold, Reduction::Sum),
            Metric::new("demand_forecast", |r| r.demand_forecast, Reduction::Sum),
        ],
    );
    rows.into_iter()
        .filter_map(|row| {
            let date = row.key.first()?.as_date()?;
            Some(DailyDemand {
                date,
                units_sold: row.value("units_sold").unwrap_or(0.0),
                demand_forecast: row.value("demand_forecast").unwrap_or(0.0),
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductError {
    pub product_id: u32,
    pub total_abs_error: f64,
}

/// The `n` products with the largest total absolute forecast error within
/// the filtered slice.
pub fn worst_forecast_products(table: &Table, filter: &RecordFilter, n: i64) -> Vec<ProductError> {
    let filtered = filter.apply(table);
    top_n(
        &filtered,
        KeyColumn::ProductId,
        "total_abs_error",
        derived_fields::abs_forecast_error,
        n,
    )
    .into_iter()
    .filter_map(|row| {
        Some(ProductError {
            product_id: row.key.first()?.as_int()?,
            total_abs_error: row.value("total_abs_error").unwrap_or(0.0),
        })
    })
    .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastBias {
    pub promotion: String,
    pub errors: Vec<f64>,
}

/// Raw signed forecast errors grouped by promotion label; box-plot input.
/// Records with a missing error are gaps, not zeros, and are left out.
pub fn forecast_bias_by_promotion(table: &Table, filter: &RecordFilter) -> Vec<ForecastBias> {
    let filtered = filter.apply(table);
    let mut by_label: BTreeMap<&'static str, Vec<f64>> = BTreeMap::new();
    for record in filtered.iter() {
        if let Some(error) = derived_fields::forecast_error(record) {
            by_label.entry(record.promotion_label()).or_default().push(error);
        }
    }
    by_label
        .into_iter()
        .map(|(label, errors)| ForecastBias {
            promotion: label.to_string(),
            errors,
        })
        .collect()
}

/// Everything the forecast page needs, bundled for serialization.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastReport {
    pub daily: Vec<DailyDemand>,
    pub worst_products: Vec<ProductError>,
    pub bias_by_promotion: Vec<ForecastBias>,
}

pub fn forecast_report(table: &Table, filter: &RecordFilter, worst_n: i64) -> ForecastReport {
    ForecastReport {
        daily: sales_vs_forecast(&filter.apply(table)),
        worst_products: worst_forecast_products(table, filter, worst_n),
        bias_by_promotion: forecast_bias_by_promotion(table, filter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Record;

    fn record(day: u32, product_id: u32, sold: f64, forecast: f64, promo: bool) -> Record {
        Record {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            product_id,
            warehouse_id: 1,
            supplier_id: 1,
            region: "West".to_string(),
            units_sold: Some(sold),
            demand_forecast: Some(forecast),
            inventory_level: None,
            reorder_point: None,
            supplier_lead_time_days: None,
            unit_price: None,
            unit_cost: None,
            promotion_flag: Some(promo),
        }
    }

    #[test]
    fn test_sales_vs_forecast_is_chronological_and_summed() {
        let table = Table::new(vec![
            record(2, 1, 10.0, 12.0, false),
            record(1, 1, 5.0, 4.0, false),
            record(1, 2, 7.0, 6.0, false),
        ]);
        let daily = sales_vs_forecast(&table);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(daily[0].units_sold, 12.0);
        assert_eq!(daily[0].demand_forecast, 10.0);
        assert_eq!(daily[1].units_sold, 10.0);
    }

    #[test]
    fn test_worst_products_ranked_by_total_abs_error() {
        let table = Table::new(vec![
            record(1, 1, 10.0, 12.0, false), // |e| = 2
            record(2, 1, 10.0, 13.0, false), // |e| = 3, product 1 total 5
            record(1, 2, 10.0, 30.0, false), // |e| = 20
        ]);
        let worst = worst_forecast_products(&table, &RecordFilter::default(), 10);
        assert_eq!(worst.len(), 2);
        assert_eq!(worst[0].product_id, 2);
        assert_eq!(worst[0].total_abs_error, 20.0);
        assert_eq!(worst[1].total_abs_error, 5.0);
    }

    #[test]
    fn test_bias_groups_by_promotion_label() {
        let table = Table::new(vec![
            record(1, 1, 10.0, 12.0, true),
            record(2, 1, 9.0, 4.0, false),
        ]);
        let bias = forecast_bias_by_promotion(&table, &RecordFilter::default());
        assert_eq!(bias.len(), 2);
        assert_eq!(bias[0].promotion, "No Promotion");
        assert_eq!(bias[0].errors, vec![5.0]);
        assert_eq!(bias[1].promotion, "Promotion");
        assert_eq!(bias[1].errors, vec![-2.0]);
    }

    #[test]
    fn test_empty_filter_result_yields_empty_report() {
        let table = Table::new(vec![record(1, 1, 10.0, 12.0, false)]);
        let filter = RecordFilter {
            region: Some("Nonexistent".to_string()),
            ..RecordFilter::default()
        };
        let report = forecast_report(&table, &filter, 10);
        assert!(report.daily.is_empty());
        assert!(report.worst_products.is_empty());
        assert!(report.bias_by_promotion.is_empty());
    }
}
