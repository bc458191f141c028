//! Dense two-dimensional reshaping for grouped/stacked charts. Every
//! (row-of-interest, axis-value) pair gets an explicit cell, 0-filled where
//! no records match, so a chart never silently omits a category.

use std::collections::HashMap;

use crate::models::Table;
use crate::pipeline::aggregation::{ColumnFn, KeyColumn, KeyValue};

/// Dense matrix of summed values, row-major.
#[derive(Clone, Debug, PartialEq)]
pub struct CrossTab {
    rows: Vec<KeyValue>,
    axis: Vec<KeyValue>,
    cells: Vec<f64>,
}

impl CrossTab {
    pub fn rows(&self) -> &[KeyValue] {
        &self.rows
    }

    pub fn axis(&self) -> &[KeyValue] {
        &self.axis
    }

    /// Total number of cells, always `rows * axis` regardless of sparsity in
    /// the source data.
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn value_at(&self, row: usize, axis: usize) -> f64 {
        self.cells[row * self.axis.len() + axis]
    }

    pub fn get(&self, row: &KeyValue, axis: &KeyValue) -> Option<f64> {
        let r = self.rows.iter().position(|v| v == row)?;
        let a = self.axis.iter().position(|v| v == axis)?;
        Some(self.value_at(r, a))
    }
}

/// Sum `value` into a dense (rows x axis) matrix. Records whose row key is
/// not in `rows` or whose axis key is not in `axis` are ignored; cells with
/// no matching records stay 0.
pub fn cross_tab(
    table: &Table,
    row_column: KeyColumn,
    rows: &[KeyValue],
    axis_column: KeyColumn,
    axis: &[KeyValue],
    value: ColumnFn,
) -> CrossTab {
    let row_index: HashMap<&KeyValue, usize> =
        rows.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let axis_index: HashMap<&KeyValue, usize> =
        axis.iter().enumerate().map(|(i, k)| (k, i)).collect();

    let mut cells = vec![0.0; rows.len() * axis.len()];
    for record in table.iter() {
        let row_key = row_column.extract(record);
        let axis_key = axis_column.extract(record);
        if let (Some(&r), Some(&a)) = (row_index.get(&row_key), axis_index.get(&axis_key)) {
            if let Some(v) = value(record) {
                cells[r * axis.len() + a] += v;
            }
        }
    }

    CrossTab {
        rows: rows.to_vec(),
        axis: axis.to_vec(),
        cells,
    }
}

/// The full region axis: every distinct region in the table, sorted.
pub fn region_axis(table: &Table) -> Vec<KeyValue> {
    let mut regions: Vec<String> = table.iter().map(|r| r.region.clone()).collect();
    regions.sort();
    regions.dedup();
    regions.into_iter().map(KeyValue::Name).collect()
}

/// The month axis `[from, to]`, both ends clamped to `[1, 12]`. Axis values
/// with no matching records are still present, zero-filled. A still-inverted
/// range yields an empty axis rather than a panic; callers treat the
/// resulting empty matrix as a "no data" state.
pub fn month_axis(from: u32, to: u32) -> Vec<KeyValue> {
    let from = from.clamp(1, 12);
    let to = to.clamp(1, 12);
    (from..=to).map(KeyValue::Int).collect()
}
