//! Folding decoded records into per-dimension counts.
//!
//! The fold is order-insensitive with respect to page boundaries: feeding
//! the same record sequence in one page or in many produces the same
//! [`Aggregate`]. The cursor tracks the highest id seen, not the last one.

use crate::decode::PageSummary;
use crate::errors::DecodeError;
use crate::model::Record;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::warn;

/// Count of records per dimension value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FrequencyTable(BTreeMap<String, u64>);

impl FrequencyTable {
    pub fn increment(&mut self, value: &str) {
        *self.0.entry(value.to_string()).or_insert(0) += 1;
    }

    pub fn get(&self, value: &str) -> u64 {
        self.0.get(value).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn total(&self) -> u64 {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Entries by count descending, ties broken by value ascending.
    pub fn ranked(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<(&str, u64)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

/// Which count a table is keyed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimension {
    Milestone,
    Product,
    Status,
}

impl Dimension {
    pub const ALL: [Dimension; 3] = [Self::Milestone, Self::Product, Self::Status];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Milestone => "milestone",
            Self::Product => "product",
            Self::Status => "status",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Milestone => "Milestone",
            Self::Product => "Product",
            Self::Status => "Status",
        }
    }
}

/// Everything one cycle learned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub milestone: FrequencyTable,
    pub product: FrequencyTable,
    pub status: FrequencyTable,
    pub records: Vec<Record>,
}

impl Aggregate {
    pub fn table(&self, dimension: Dimension) -> &FrequencyTable {
        match dimension {
            Dimension::Milestone => &self.milestone,
            Dimension::Product => &self.product,
            Dimension::Status => &self.status,
        }
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Counts per `Product::Component`. Terminal output only, so it is
    /// derived on demand rather than kept with the served tables.
    pub fn component_counts(&self) -> FrequencyTable {
        let mut counts = FrequencyTable::default();
        for record in &self.records {
            counts.increment(&record.component_label());
        }
        counts
    }

    pub fn unset_milestone_count(&self) -> usize {
        self.records.iter().filter(|r| r.milestone_is_unset()).count()
    }

    /// Records grouped by milestone, milestones in ranked order and records
    /// in cycle order within each group.
    pub fn by_milestone(&self) -> Vec<(&str, Vec<&Record>)> {
        self.milestone
            .ranked()
            .into_iter()
            .map(|(milestone, _)| {
                let rows = self
                    .records
                    .iter()
                    .filter(|r| r.milestone == milestone)
                    .collect();
                (milestone, rows)
            })
            .collect()
    }
}

/// Outcome of comparing a finished page against the upstream ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageBoundary {
    /// The page was full; another page may exist past the cursor.
    More,
    /// The page was short; the cycle is complete.
    Final,
}

impl PageBoundary {
    pub fn classify(rows: usize, ceiling: usize) -> Self {
        if rows >= ceiling {
            Self::More
        } else {
            Self::Final
        }
    }
}

/// Running fold for one cycle.
#[derive(Debug, Default)]
pub struct Aggregator {
    aggregate: Aggregate,
    cursor: u64,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highest bug id folded so far; 0 before any record.
    pub fn cursor(&self) -> u64 {
        self.cursor
    }

    pub fn fold(&mut self, record: Record) {
        self.aggregate.milestone.increment(&record.milestone);
        self.aggregate.product.increment(&record.product);
        self.aggregate.status.increment(&record.status);
        self.cursor = self.cursor.max(record.id);
        self.aggregate.records.push(record);
    }

    /// Fold every row of a page, logging and skipping rows that failed to
    /// decode. Returns the page's row counts.
    pub fn fold_page<I>(&mut self, rows: I) -> PageSummary
    where
        I: IntoIterator<Item = Result<Record, DecodeError>>,
    {
        let mut summary = PageSummary::default();
        for row in rows {
            match row {
                Ok(record) => {
                    summary.decoded += 1;
                    self.fold(record);
                }
                Err(err) => {
                    summary.skipped += 1;
                    warn!(line = ?err.line, error = %err.message, "skipping undecodable row");
                }
            }
        }
        summary
    }

    pub fn aggregate(&self) -> &Aggregate {
        &self.aggregate
    }

    pub fn finish(self) -> Aggregate {
        self.aggregate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::record;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_three_row_example() {
        let mut aggregator = Aggregator::new();
        aggregator.fold(record(1, "M1", "Core", "NEW"));
        aggregator.fold(record(2, "M2", "Core", "NEW"));
        aggregator.fold(record(3, "M1", "UI", "RESOLVED"));
        let aggregate = aggregator.finish();

        assert_eq!(aggregate.milestone.get("M1"), 2);
        assert_eq!(aggregate.milestone.get("M2"), 1);
        assert_eq!(aggregate.product.get("Core"), 2);
        assert_eq!(aggregate.product.get("UI"), 1);
        assert_eq!(aggregate.status.get("NEW"), 2);
        assert_eq!(aggregate.status.get("RESOLVED"), 1);
        assert_eq!(aggregate.record_count(), 3);
    }

    #[test]
    fn test_cursor_is_max_not_last() {
        let mut aggregator = Aggregator::new();
        for id in [5, 3, 9, 7] {
            aggregator.fold(record(id, "M1", "Core", "NEW"));
        }
        assert_eq!(aggregator.cursor(), 9);
    }

    #[test]
    fn test_fold_page_skips_errors() {
        let mut aggregator = Aggregator::new();
        let rows = vec![
            Ok(record(1, "M1", "Core", "NEW")),
            Err(DecodeError {
                line: Some(3),
                message: "found record with 4 fields".into(),
            }),
            Ok(record(4, "M1", "Core", "NEW")),
        ];
        let summary = aggregator.fold_page(rows);

        assert_eq!(summary, PageSummary { decoded: 2, skipped: 1 });
        assert_eq!(aggregator.cursor(), 4);
        assert_eq!(aggregator.aggregate().record_count(), 2);
    }

    #[test]
    fn test_ranked_orders_by_count_then_name() {
        let mut table = FrequencyTable::default();
        for value in ["b", "a", "c", "c", "b"] {
            table.increment(value);
        }
        assert_eq!(table.ranked(), vec![("b", 2), ("c", 2), ("a", 1)]);
        assert_eq!(table.total(), 5);
        assert_eq!(table.get("zzz"), 0);
    }

    #[test]
    fn test_by_milestone_keeps_cycle_order() {
        let mut aggregator = Aggregator::new();
        aggregator.fold(record(10, "M2", "Core", "NEW"));
        aggregator.fold(record(11, "M1", "Core", "NEW"));
        aggregator.fold(record(12, "M2", "Core", "NEW"));
        let aggregate = aggregator.finish();

        let groups = aggregate.by_milestone();
        assert_eq!(groups[0].0, "M2");
        let ids: Vec<u64> = groups[0].1.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![10, 12]);
        assert_eq!(groups[1].0, "M1");
    }

    #[test]
    fn test_component_counts_and_unset_milestones() {
        let mut aggregator = Aggregator::new();
        aggregator.fold(record(1, "---", "Core", "NEW"));
        aggregator.fold(record(2, "M1", "Core", "NEW"));
        let mut ui = record(3, "", "Firefox", "NEW");
        ui.component = String::new();
        aggregator.fold(ui);
        let aggregate = aggregator.finish();

        let components = aggregate.component_counts();
        assert_eq!(components.get("Core::General"), 2);
        assert_eq!(components.get("Firefox"), 1);
        assert_eq!(components.total(), 3);
        assert_eq!(aggregate.unset_milestone_count(), 2);
    }

    #[test]
    fn test_page_boundary() {
        assert_eq!(PageBoundary::classify(10_000, 10_000), PageBoundary::More);
        assert_eq!(PageBoundary::classify(9_999, 10_000), PageBoundary::Final);
        assert_eq!(PageBoundary::classify(0, 10_000), PageBoundary::Final);
    }
}
