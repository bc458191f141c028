//! Derived quantities, each a pure function of one record or of aggregate
//! inputs. A result is `None` whenever an input is missing or a ratio's
//! denominator is not positive; callers propagate the gap instead of
//! substituting 0 or infinity.

use crate::models::Record;

/// `units_sold - demand_forecast`. Positive means the forecast was too low.
pub fn forecast_error(r: &Record) -> Option<f64> {
    match (r.units_sold, r.demand_forecast) {
        (Some(sold), Some(forecast)) => Some(sold - forecast),
        _ => None,
    }
}

pub fn abs_forecast_error(r: &Record) -> Option<f64> {
    forecast_error(r).map(f64::abs)
}

/// `(unit_price - unit_cost) * units_sold`.
pub fn profit(r: &Record) -> Option<f64> {
    match (r.unit_price, r.unit_cost, r.units_sold) {
        (Some(price), Some(cost), Some(sold)) => Some((price - cost) * sold),
        _ => None,
    }
}

/// `avg_inventory / (avg_daily_sales * 7)`.
///
/// Undefined when average daily sales are not positive; the gap is carried as
/// `None` and such rows are excluded from any ranking by this metric.
pub fn weeks_of_cover(avg_inventory: Option<f64>, avg_daily_sales: Option<f64>) -> Option<f64> {
    let inventory = avg_inventory?;
    let sales = avg_daily_sales?;
    if sales <= 0.0 {
        return None;
    }
    Some(inventory / (sales * 7.0))
}

/// Expected demand between placing an order and receiving it:
/// `avg_daily_sales * avg_lead_time`.
pub fn demand_during_lead_time(
    avg_daily_sales: Option<f64>,
    avg_lead_time: Option<f64>,
) -> Option<f64> {
    Some(avg_daily_sales? * avg_lead_time?)
}
