use std::collections::BTreeSet;

use crate::models::{Record, Table};

/// Conjunctive user-selected predicates applied before aggregation.
///
/// `None` (or an empty supplier set) on a dimension means "no filter on that
/// dimension", never "match nothing". A filter that matches no records
/// returns an empty table, which every downstream stage accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub suppliers: Option<BTreeSet<u32>>,
    pub warehouse: Option<u32>,
    pub region: Option<String>,
    pub month_range: Option<(u32, u32)>,
}

impl RecordFilter {
    pub fn matches(&self, r: &Record) -> bool {
        let supplier_ok = self
            .suppliers
            .as_ref()
            .map_or(true, |set| set.is_empty() || set.contains(&r.supplier_id));
        let warehouse_ok = self.warehouse.map_or(true, |w| r.warehouse_id == w);
        let region_ok = self.region.as_ref().map_or(true, |reg| &r.region == reg);
        let month_ok = self
            .month_range
            .map_or(true, |(from, to)| (from..=to).contains(&r.month()));

        supplier_ok && warehouse_ok && region_ok && month_ok
    }

    pub fn apply(&self, table: &Table) -> Table {
        Table::new(table.iter().filter(|r| self.matches(r)).cloned().collect())
    }
}
