//! Row format shared by all sources.

use serde::{Deserialize, Serialize};

/// One item of the production log.
///
/// Extra columns in the source document are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRecord {
    /// Category (e.g. flavor) the item belongs to.
    #[serde(alias = "flavor")]
    pub category: String,

    /// Current status label of the item. Missing cells read as empty.
    #[serde(default, alias = "state")]
    pub status: String,
}

impl ProductionRecord {
    pub fn new(category: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            status: status.into(),
        }
    }
}

/// Accepted top-level shapes of a rows document.
///
/// Either a bare array of rows or an object wrapping them under `rows`.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RowsPayload {
    List(Vec<ProductionRecord>),
    Wrapped { rows: Vec<ProductionRecord> },
}

impl RowsPayload {
    pub fn into_rows(self) -> Vec<ProductionRecord> {
        match self {
            RowsPayload::List(rows) => rows,
            RowsPayload::Wrapped { rows } => rows,
        }
    }
}
