//! Generic group-by engine. One implementation serves every view: grouping is
//! total (every distinct key value appears exactly once, ascending), and
//! reductions operate on the non-missing values of the group.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;

use crate::models::{Record, Table};

/// A single grouping key value. Ordering is numeric for ids and months,
/// chronological for dates, lexicographic for names.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyValue {
    Int(u32),
    Date(NaiveDate),
    Name(String),
}

impl KeyValue {
    pub fn as_int(&self) -> Option<u32> {
        match self {
            KeyValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            KeyValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_name(&self) -> Option<&str> {
        match self {
            KeyValue::Name(n) => Some(n),
            _ => None,
        }
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyValue::Int(v) => write!(f, "{}", v),
            KeyValue::Date(d) => write!(f, "{}", d),
            KeyValue::Name(n) => write!(f, "{}", n),
        }
    }
}

/// Columns a table can be grouped by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyColumn {
    ProductId,
    WarehouseId,
    SupplierId,
    Region,
    Month,
    Promotion,
    Date,
}

impl KeyColumn {
    pub fn extract(&self, r: &Record) -> KeyValue {
        match self {
            KeyColumn::ProductId => KeyValue::Int(r.product_id),
            KeyColumn::WarehouseId => KeyValue::Int(r.warehouse_id),
            KeyColumn::SupplierId => KeyValue::Int(r.supplier_id),
            KeyColumn::Region => KeyValue::Name(r.region.clone()),
            KeyColumn::Month => KeyValue::Int(r.month()),
            KeyColumn::Promotion => KeyValue::Name(r.promotion_label().to_string()),
            KeyColumn::Date => KeyValue::Date(r.date),
        }
    }
}

/// Accessor for the numeric column a metric reduces. Base columns and derived
/// fields both fit; a missing value is `None`.
pub type ColumnFn = fn(&Record) -> Option<f64>;

/// Supported reductions.
///
/// All of them skip missing values. `Mean`, `Median`, `Min`, `Max` and `Std`
/// of a group with no non-missing values are `None`; `Sum` of such a group is
/// 0.0. `Count` is the group row count, so every record counts exactly once
/// regardless of missing fields. `Std` is the population standard deviation
/// (ddof = 0): a single-member group has std 0, not an undefined value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Reduction {
    Sum,
    Mean,
    Median,
    Min,
    Max,
    Std,
    Count,
}

/// One output field of an aggregation: a name, a source column, a reduction.
#[derive(Clone, Copy)]
pub struct Metric {
    pub name: &'static str,
    pub column: ColumnFn,
    pub reduction: Reduction,
}

impl Metric {
    pub fn new(name: &'static str, column: ColumnFn, reduction: Reduction) -> Self {
        Metric {
            name,
            column,
            reduction,
        }
    }
}

/// All records sharing one key value, reduced.
#[derive(Clone, Debug, PartialEq)]
pub struct AggregateRow {
    pub key: Vec<KeyValue>,
    /// Number of records in the group.
    pub count: usize,
    values: BTreeMap<&'static str, Option<f64>>,
}

impl AggregateRow {
    /// The reduced statistic under `name`; `None` when the statistic is
    /// undefined for this group or was not requested.
    pub fn value(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied().flatten()
    }
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

fn reduce(reduction: Reduction, values: &[f64], group_len: usize) -> Option<f64> {
    match reduction {
        Reduction::Count => Some(group_len as f64),
        Reduction::Sum => Some(values.iter().sum()),
        _ if values.is_empty() => None,
        Reduction::Mean => Some(values.iter().sum::<f64>() / values.len() as f64),
        Reduction::Median => {
            let mut sorted = values.to_vec();
            Some(median(&mut sorted))
        }
        Reduction::Min => Some(values.iter().copied().fold(f64::INFINITY, f64::min)),
        Reduction::Max => Some(values.iter().copied().fold(f64::NEG_INFINITY, f64::max)),
        Reduction::Std => {
            let n = values.len() as f64;
            let mean = values.iter().sum::<f64>() / n;
            let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
            Some(variance.sqrt())
        }
    }
}

/// Group `table` by one or two key columns and reduce each group.
///
/// Output rows are ordered by ascending key. No group is dropped: the set of
/// output keys equals the set of distinct key values in the input.
pub fn aggregate(table: &Table, keys: &[KeyColumn], metrics: &[Metric]) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<Vec<KeyValue>, Vec<&Record>> = BTreeMap::new();
    for record in table.iter() {
        let key: Vec<KeyValue> = keys.iter().map(|k| k.extract(record)).collect();
        groups.entry(key).or_default().push(record);
    }

    groups
        .into_iter()
        .map(|(key, members)| {
            let values = metrics
                .iter()
                .map(|m| {
                    let column_values: Vec<f64> =
                        members.iter().filter_map(|r| (m.column)(r)).collect();
                    (m.name, reduce(m.reduction, &column_values, members.len()))
                })
                .collect();
            AggregateRow {
                key,
                count: members.len(),
                values,
            }
        })
        .collect()
}

fn sort_descending(rows: &mut [AggregateRow], metric_name: &str) {
    rows.sort_by(|a, b| {
        let a_value = a.value(metric_name).unwrap_or(f64::NEG_INFINITY);
        let b_value = b.value(metric_name).unwrap_or(f64::NEG_INFINITY);
        b_value
            .partial_cmp(&a_value)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// The `n` key values with the largest summed `column`: sum per group, sort
/// descending, break ties by ascending key, truncate. `n <= 0` yields an
/// empty sequence.
pub fn top_n(
    table: &Table,
    key: KeyColumn,
    metric_name: &'static str,
    column: ColumnFn,
    n: i64,
) -> Vec<AggregateRow> {
    if n <= 0 {
        return Vec::new();
    }
    let mut rows = aggregate(table, &[key], &[Metric::new(metric_name, column, Reduction::Sum)]);
    sort_descending(&mut rows, metric_name);
    rows.truncate(n as usize);
    rows
}

/// Rank already-aggregated rows by a named statistic, descending, ties by
/// ascending key, truncated to `n`. Rows where the statistic is undefined are
/// excluded from the ranking entirely.
pub fn rank_aggregates(
    mut rows: Vec<AggregateRow>,
    metric_name: &str,
    n: i64,
) -> Vec<AggregateRow> {
    if n <= 0 {
        return Vec::new();
    }
    rows.retain(|row| row.value(metric_name).is_some());
    sort_descending(&mut rows, metric_name);
    rows.truncate(n as usize);
    rows
}
