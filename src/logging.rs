//! Tracing subscriber setup.
//!
//! The full-screen display owns stdout and stderr, so logs go either to a
//! file, to stderr in plain mode, or nowhere.

use std::fs::OpenOptions;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set.
const DEFAULT_FILTER: &str = "info";

/// Errors that may occur while initializing logging.
#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// Failed to open the log file for appending.
    #[error("Failed to open log file {path}: {source}")]
    OpenFile { path: PathBuf, source: io::Error },
    /// A global subscriber is already installed.
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(String),
}

/// Where log lines are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append plain (non-ANSI) lines to a file.
    File(PathBuf),
    Stderr,
    Discard,
}

impl LogTarget {
    /// Pick the target for the given display mode.
    pub fn select(log_file: Option<PathBuf>, plain_display: bool) -> Self {
        match log_file {
            Some(path) => LogTarget::File(path),
            None if plain_display => LogTarget::Stderr,
            None => LogTarget::Discard,
        }
    }
}

/// Install the global subscriber for `target`.
pub fn init(target: &LogTarget) -> Result<(), LoggingError> {
    match target {
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::OpenFile {
                    path: path.clone(),
                    source,
                })?;
            install(Arc::new(file), false)
        }
        LogTarget::Stderr => install(io::stderr, true),
        LogTarget::Discard => install(io::sink, false),
    }
}

fn install<W>(writer: W, ansi: bool) -> Result<(), LoggingError>
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(ansi)
        .with_writer(writer)
        .try_init()
        .map_err(|e| LoggingError::SetGlobal(e.to_string()))
}
