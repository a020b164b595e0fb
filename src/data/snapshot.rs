//! Aggregation of production rows into per-category counts.

use std::collections::BTreeMap;

use serde::Serialize;

use super::progress::Progress;
use crate::source::ProductionRecord;

/// Produced/target counts for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CategoryCount {
    /// Items of this category in the complete status.
    pub produced: u64,
    /// All items of this category, whatever their status.
    pub target: u64,
}

impl CategoryCount {
    pub fn progress(&self) -> Progress {
        Progress::new(self.produced, self.target)
    }
}

/// One point-in-time read of the production log.
///
/// Categories are discovered from the data; nothing is fixed up front.
/// `total_produced <= total_target` holds for snapshots built from rows but
/// is not relied upon anywhere.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ProductionSnapshot {
    pub per_category: BTreeMap<String, CategoryCount>,
    /// Number of rows per status label, for the status breakdown line.
    pub by_status: BTreeMap<String, u64>,
    pub total_produced: u64,
    pub total_target: u64,
}

impl ProductionSnapshot {
    /// Aggregate raw rows. Rows with a blank category are skipped.
    pub fn from_records(records: &[ProductionRecord], complete_status: &str) -> Self {
        let mut per_category: BTreeMap<String, CategoryCount> = BTreeMap::new();
        let mut by_status: BTreeMap<String, u64> = BTreeMap::new();

        for record in records {
            if record.category.trim().is_empty() {
                continue;
            }

            let count = per_category.entry(record.category.clone()).or_default();
            count.target += 1;
            if record.status == complete_status {
                count.produced += 1;
            }

            *by_status.entry(record.status.clone()).or_default() += 1;
        }

        Self::with_totals(per_category, by_status)
    }

    /// Build a snapshot from already aggregated `(produced, target)` pairs.
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, (u64, u64))>,
        S: Into<String>,
    {
        let per_category = counts
            .into_iter()
            .map(|(name, (produced, target))| (name.into(), CategoryCount { produced, target }))
            .collect();

        Self::with_totals(per_category, BTreeMap::new())
    }

    fn with_totals(
        per_category: BTreeMap<String, CategoryCount>,
        by_status: BTreeMap<String, u64>,
    ) -> Self {
        let total_produced = per_category.values().map(|c| c.produced).sum();
        let total_target = per_category.values().map(|c| c.target).sum();

        Self {
            per_category,
            by_status,
            total_produced,
            total_target,
        }
    }

    /// Progress of the aggregate.
    pub fn total_progress(&self) -> Progress {
        Progress::new(self.total_produced, self.total_target)
    }
}
