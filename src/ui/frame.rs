//! Structured description of one display repaint.
//!
//! A [`DisplayFrame`] holds everything a sink needs to draw, already
//! computed: bar fill, color level, labels. Sinks only lay it out.

use std::time::Duration;

use crate::data::duration::format_duration;
use crate::data::{Eta, Metrics, ProductionSnapshot, Progress, ProgressLevel, RateTrend};

/// Label of the aggregate bar.
pub const TOTAL_LABEL: &str = "Total";

/// Presentation settings that do not change between cycles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOptions {
    pub title: String,
    /// Unit name used in the rate line ("items/min").
    pub unit: String,
    /// Bar width in blocks.
    pub bar_width: usize,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            title: "PRODUCTION PROGRESS".to_string(),
            unit: "items".to_string(),
            bar_width: 25,
        }
    }
}

/// One progress bar.
#[derive(Debug, Clone, PartialEq)]
pub struct BarRow {
    pub label: String,
    pub progress: Progress,
    pub width: usize,
    pub filled: usize,
    pub level: ProgressLevel,
}

impl BarRow {
    pub fn new(label: impl Into<String>, progress: Progress, width: usize) -> Self {
        Self {
            label: label.into(),
            progress,
            width,
            filled: progress.filled_blocks(width),
            level: progress.level(),
        }
    }

    pub fn empty(&self) -> usize {
        self.width - self.filled
    }

    /// "produced/target (pct%)".
    pub fn counts_label(&self) -> String {
        format!(
            "{}/{} ({}%)",
            self.progress.produced,
            self.progress.target,
            self.progress.percent()
        )
    }
}

/// Whether the frame reflects the latest fetch.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameStatus {
    Live,
    /// The latest fetch failed; the figures are from the last good cycle.
    Stale {
        reason: String,
        failures: u32,
        retry_in: Duration,
    },
}

/// Everything drawn in one repaint.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayFrame {
    pub title: String,
    pub categories: Vec<BarRow>,
    pub total: BarRow,
    /// Row count per status label, in label order.
    pub statuses: Vec<(String, u64)>,
    pub rate_per_minute: f64,
    pub trend: RateTrend,
    pub unit: String,
    pub eta: Eta,
    pub remaining: i64,
    pub elapsed: Duration,
    pub source: String,
    pub status: FrameStatus,
}

impl DisplayFrame {
    pub fn build(
        snapshot: &ProductionSnapshot,
        metrics: &Metrics,
        options: &FrameOptions,
        source: &str,
    ) -> Self {
        let categories = snapshot
            .per_category
            .iter()
            .map(|(name, count)| BarRow::new(name.clone(), count.progress(), options.bar_width))
            .collect();

        let statuses = snapshot
            .by_status
            .iter()
            .map(|(status, count)| (status.clone(), *count))
            .collect();

        Self {
            title: options.title.clone(),
            categories,
            total: BarRow::new(TOTAL_LABEL, snapshot.total_progress(), options.bar_width),
            statuses,
            rate_per_minute: metrics.rate_per_minute,
            trend: metrics.trend(),
            unit: options.unit.clone(),
            eta: metrics.eta,
            remaining: metrics.remaining,
            elapsed: metrics.elapsed,
            source: source.to_string(),
            status: FrameStatus::Live,
        }
    }

    /// Mark the frame as showing last-known data.
    pub fn stale(mut self, reason: impl Into<String>, failures: u32, retry_in: Duration) -> Self {
        self.status = FrameStatus::Stale {
            reason: reason.into(),
            failures,
            retry_in,
        };
        self
    }

    pub fn is_stale(&self) -> bool {
        matches!(self.status, FrameStatus::Stale { .. })
    }

    /// Width of the label column, so bars line up.
    pub fn label_width(&self) -> usize {
        self.categories
            .iter()
            .map(|row| row.label.chars().count())
            .chain(std::iter::once(self.total.label.chars().count()))
            .max()
            .unwrap_or(0)
    }

    pub fn rate_label(&self) -> String {
        format!("{:.2} {}/min", self.rate_per_minute, self.unit)
    }

    pub fn eta_label(&self) -> String {
        self.eta.label()
    }

    pub fn remaining_label(&self) -> String {
        format!("{} remaining", self.remaining)
    }

    /// "OK 10 · PENDING 3"; `None` when there is no breakdown.
    pub fn status_breakdown(&self) -> Option<String> {
        if self.statuses.is_empty() {
            return None;
        }
        let parts: Vec<String> = self
            .statuses
            .iter()
            .map(|(status, count)| {
                let status = if status.is_empty() { "(blank)" } else { status.as_str() };
                format!("{} {}", status, count)
            })
            .collect();
        Some(parts.join(" · "))
    }

    /// Bottom line: source, uptime, and the stale marker when present.
    pub fn footer(&self) -> String {
        let base = format!("{} | running {}", self.source, format_duration(self.elapsed));
        match &self.status {
            FrameStatus::Live => base,
            FrameStatus::Stale {
                reason,
                failures,
                retry_in,
            } => format!(
                "STALE DATA: {} ({} failed, retry in {}) | {}",
                reason,
                failures,
                format_duration(*retry_in),
                base
            ),
        }
    }
}
