//! Data source abstraction for reading production rows.
//!
//! A source hands back the raw rows of the production log (one record per
//! item, each with a category and a status label). Aggregation into counts
//! happens in [`crate::data`], so every source only has to fetch and parse.

mod error;
mod file;
#[cfg(feature = "http")]
mod http;
mod record;

pub use error::SourceUnavailable;
pub use file::FileSource;
#[cfg(feature = "http")]
pub use http::{HttpSource, HttpSourceBuilder};
pub use record::{ProductionRecord, RowsPayload};

use std::fmt::Debug;

/// Trait for reading production rows from an external store.
///
/// # Example
///
/// ```no_run
/// use prodwatch::{DataSource, FileSource};
///
/// let mut source = FileSource::new("rows.json");
/// match source.read_rows() {
///     Ok(rows) => println!("{} rows from {}", rows.len(), source.description()),
///     Err(e) => eprintln!("{e}"),
/// }
/// ```
pub trait DataSource: Send + Debug {
    /// Fetch the current rows.
    ///
    /// Any failure to reach or decode the store is reported as
    /// [`SourceUnavailable`]; the caller decides whether to retry.
    fn read_rows(&mut self) -> Result<Vec<ProductionRecord>, SourceUnavailable>;

    /// Returns a human-readable description of the source.
    ///
    /// Used for display in the status line.
    fn description(&self) -> &str;
}
