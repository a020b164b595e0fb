//! Data models and derived numbers for production snapshots.
//!
//! ## Submodules
//!
//! - [`duration`]: Parsing and formatting of duration strings (e.g., "5s", "2m")
//! - [`snapshot`]: Aggregation of rows into [`ProductionSnapshot`]
//! - [`progress`]: Ratios, bar fill, and [`ProgressLevel`] thresholds
//! - [`metrics`]: Average rate and ETA ([`Metrics`])
//!
//! ## Data Flow
//!
//! ```text
//! Vec<ProductionRecord> (raw rows)
//!        │
//!        ▼
//! ProductionSnapshot::from_records()
//!        │
//!        ├──▶ Progress / ProgressLevel per category and total
//!        │
//!        └──▶ Metrics::compute() (against the launch baseline)
//! ```

pub mod duration;
pub mod metrics;
pub mod progress;
pub mod snapshot;

pub use metrics::{Eta, Metrics, RateTrend, ETA_PLACEHOLDER};
pub use progress::{Progress, ProgressLevel, COMPLETE_THRESHOLD, MID_PROGRESS_THRESHOLD};
pub use snapshot::{CategoryCount, ProductionSnapshot};
