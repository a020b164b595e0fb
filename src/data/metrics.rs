//! Throughput and ETA derived from a snapshot and the monitor baseline.

use std::time::Duration;

use super::snapshot::ProductionSnapshot;

/// Placeholder shown when no ETA can be projected.
pub const ETA_PLACEHOLDER: &str = "--";

/// Projected time to reach the target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Eta {
    /// Finite, non-negative number of minutes.
    Minutes(f64),
    /// Rate is zero or negative; there is nothing to project.
    Unknown,
}

impl Eta {
    pub fn minutes(&self) -> Option<f64> {
        match self {
            Eta::Minutes(m) => Some(*m),
            Eta::Unknown => None,
        }
    }

    /// Display text: one decimal place, or the placeholder.
    pub fn label(&self) -> String {
        match self {
            Eta::Minutes(m) => format!("{:.1} min", m),
            Eta::Unknown => ETA_PLACEHOLDER.to_string(),
        }
    }
}

/// Direction of the average rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateTrend {
    /// Production is advancing.
    Gaining,
    /// Nothing produced since launch (or no time has passed yet).
    Idle,
    /// Completed items were reverted since launch.
    Losing,
}

/// Derived numbers for one cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    /// Time since the monitor started.
    pub elapsed: Duration,
    /// `total_produced - baseline_produced`; negative when counts regressed.
    pub produced_since_start: i64,
    /// Average items per minute since launch. May be negative.
    pub rate_per_minute: f64,
    /// `total_target - total_produced`; negative when over target.
    pub remaining: i64,
    pub eta: Eta,
}

impl Metrics {
    /// Compute metrics for `snapshot` against a fixed baseline.
    ///
    /// Degenerate inputs never fail: zero elapsed time gives a zero rate and
    /// a non-positive rate gives [`Eta::Unknown`].
    pub fn compute(snapshot: &ProductionSnapshot, baseline_produced: u64, elapsed: Duration) -> Self {
        let elapsed_minutes = elapsed.as_secs_f64() / 60.0;
        let produced_since_start = signed_difference(snapshot.total_produced, baseline_produced);

        let rate_per_minute = if elapsed_minutes > 0.0 {
            produced_since_start as f64 / elapsed_minutes
        } else {
            0.0
        };

        let remaining = signed_difference(snapshot.total_target, snapshot.total_produced);

        let eta = if rate_per_minute > 0.0 {
            let minutes = remaining.max(0) as f64 / rate_per_minute;
            if minutes.is_finite() {
                Eta::Minutes(minutes)
            } else {
                Eta::Unknown
            }
        } else {
            Eta::Unknown
        };

        Self {
            elapsed,
            produced_since_start,
            rate_per_minute,
            remaining,
            eta,
        }
    }

    pub fn trend(&self) -> RateTrend {
        if self.rate_per_minute > 0.0 {
            RateTrend::Gaining
        } else if self.rate_per_minute < 0.0 {
            RateTrend::Losing
        } else {
            RateTrend::Idle
        }
    }
}

fn signed_difference(a: u64, b: u64) -> i64 {
    (a as i128 - b as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
}
