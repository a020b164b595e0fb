//! Error type for data sources.

use std::path::PathBuf;

use thiserror::Error;

/// The data source could not produce rows this cycle.
///
/// Every variant is transient from the monitor's point of view: the loop
/// driver logs it and retries on the next interval.
#[derive(Debug, Error)]
pub enum SourceUnavailable {
    /// Reading the backing file failed.
    #[error("Read error on {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The payload was not a valid rows document.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The HTTP endpoint answered with a failure status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Credentials were rejected or the session expired.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// The endpoint could not be reached.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The fetch did not complete within the configured timeout.
    #[error("Request timed out")]
    Timeout,
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for SourceUnavailable {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceUnavailable::Timeout
        } else if err.is_connect() {
            SourceUnavailable::Connection(err.to_string())
        } else if err.is_decode() {
            SourceUnavailable::Parse(err.to_string())
        } else {
            SourceUnavailable::Http(err.to_string())
        }
    }
}
