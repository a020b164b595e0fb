//! # prodwatch
//!
//! A live terminal monitor for production progress.
//!
//! It polls a source of production rows (category plus status), counts
//! produced items against targets per category, and repaints progress bars,
//! the average production rate since launch, and an ETA for the remaining
//! work.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                            driver                                │
//! │  ┌─────────┐    ┌────────────┐    ┌────────────┐    ┌─────────┐  │
//! │  │ source  │───▶│  monitor   │───▶│    data    │───▶│   ui    │  │
//! │  │ (rows)  │    │ (baseline) │    │(rate, ETA) │    │ (sinks) │  │
//! │  └─────────┘    └─────┬──────┘    └────────────┘    └─────────┘  │
//! │                       │                                          │
//! │                       ▼                                          │
//! │                  ┌─────────┐                                     │
//! │                  │  clock  │◀── SystemClock | KeyboardClock      │
//! │                  └─────────┘                                     │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! - **[`source`]**: The [`DataSource`] trait with [`FileSource`] (JSON file
//!   polling) and, with the `http` feature, `HttpSource`
//! - **[`monitor`]**: [`RateMonitor`], which fixes the launch baseline and
//!   samples snapshots
//! - **[`data`]**: Snapshot aggregation, progress levels, rate and ETA
//! - **[`driver`]**: The loop: sample, compute, render, sleep, with
//!   backoff and stale frames on fetch failures
//! - **[`ui`]**: [`DisplayFrame`] and the [`FrameSink`] implementations
//!   (full-screen ratatui and plain text)
//!
//! ## Usage
//!
//! ### As a CLI tool
//!
//! ```bash
//! # Watch a JSON rows file
//! prodwatch --file rows.json
//!
//! # Poll an HTTP endpoint every 10 seconds
//! prodwatch --url https://example.com/rows --token "$TOKEN" --interval 10s
//!
//! # Plain text output, no colors
//! prodwatch --file rows.json --plain --no-color
//! ```
//!
//! ### As a library
//!
//! ```no_run
//! use std::time::Duration;
//! use prodwatch::{Driver, FileSource, FrameOptions, RateMonitor, SystemClock, TextSink};
//!
//! # fn main() -> anyhow::Result<()> {
//! let source = Box::new(FileSource::new("rows.json"));
//! let monitor = RateMonitor::initialize(source, SystemClock::new(), "OK")?;
//! let mut driver = Driver::new(
//!     monitor,
//!     Box::new(TextSink::stdout(true)),
//!     FrameOptions::default(),
//!     Duration::from_secs(5),
//!     Duration::from_secs(60),
//! );
//! driver.run()?;
//! # Ok(())
//! # }
//! ```

pub mod backoff;
pub mod clock;
pub mod config;
pub mod data;
pub mod driver;
pub mod events;
pub mod logging;
pub mod monitor;
pub mod source;
pub mod ui;

// Re-export main types for convenience
pub use backoff::Backoff;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{MonitorConfig, SourceSpec};
pub use data::{Eta, Metrics, ProductionSnapshot, Progress, ProgressLevel, RateTrend};
pub use driver::{Driver, LoopState};
pub use events::KeyboardClock;
pub use monitor::{MonitorState, RateMonitor};
#[cfg(feature = "http")]
pub use source::HttpSource;
pub use source::{DataSource, FileSource, ProductionRecord, SourceUnavailable};
pub use ui::{DisplayFrame, FrameOptions, FrameSink, RenderError, TerminalSink, TextSink, Theme};
