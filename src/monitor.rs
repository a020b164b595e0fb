//! Sampling and rate-estimation state.

use std::time::Instant;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::data::{Metrics, ProductionSnapshot};
use crate::source::{DataSource, SourceUnavailable};

/// State kept for the lifetime of a monitor run.
#[derive(Debug, Clone)]
pub struct MonitorState {
    /// When the monitor was initialized.
    pub start_time: Instant,
    /// `total_produced` at `start_time`. Never changes afterwards.
    pub baseline_produced: u64,
    /// Most recent successful snapshot.
    pub last_snapshot: ProductionSnapshot,
}

/// Samples the data source and derives throughput against a fixed baseline.
///
/// Rates are always "average since launch": they are computed from
/// `start_time` and `baseline_produced`, never from the previous sample.
pub struct RateMonitor<C: Clock> {
    source: Box<dyn DataSource>,
    clock: C,
    complete_status: String,
    state: MonitorState,
}

impl<C: Clock> RateMonitor<C> {
    /// Fetch the initial snapshot and fix the baseline.
    pub fn initialize(
        mut source: Box<dyn DataSource>,
        clock: C,
        complete_status: impl Into<String>,
    ) -> Result<Self, SourceUnavailable> {
        let complete_status = complete_status.into();
        let start_time = clock.now();
        let rows = source.read_rows()?;
        let snapshot = ProductionSnapshot::from_records(&rows, &complete_status);

        info!(
            source = source.description(),
            baseline = snapshot.total_produced,
            target = snapshot.total_target,
            categories = snapshot.per_category.len(),
            "Monitor initialized"
        );

        Ok(Self {
            source,
            clock,
            complete_status,
            state: MonitorState {
                start_time,
                baseline_produced: snapshot.total_produced,
                last_snapshot: snapshot,
            },
        })
    }

    /// Fetch and aggregate the current rows.
    ///
    /// On success the snapshot replaces `last_snapshot`. On failure the state
    /// is left untouched and the error is returned to the caller.
    pub fn sample(&mut self) -> Result<ProductionSnapshot, SourceUnavailable> {
        let rows = self.source.read_rows()?;
        let snapshot = ProductionSnapshot::from_records(&rows, &self.complete_status);

        debug!(
            rows = rows.len(),
            produced = snapshot.total_produced,
            target = snapshot.total_target,
            "Sampled source"
        );

        self.state.last_snapshot = snapshot.clone();
        Ok(snapshot)
    }

    /// Derive rate and ETA for `snapshot` at the current clock time.
    pub fn compute_metrics(&self, snapshot: &ProductionSnapshot) -> Metrics {
        let elapsed = self.clock.now().saturating_duration_since(self.state.start_time);
        Metrics::compute(snapshot, self.state.baseline_produced, elapsed)
    }

    pub fn state(&self) -> &MonitorState {
        &self.state
    }

    pub fn baseline_produced(&self) -> u64 {
        self.state.baseline_produced
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Returns a description of the current data source.
    pub fn source_description(&self) -> &str {
        self.source.description()
    }
}
