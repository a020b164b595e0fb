//! File-based data source.
//!
//! Polls a JSON rows document on disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use super::{DataSource, ProductionRecord, RowsPayload, SourceUnavailable};

/// A data source that reads production rows from a JSON file.
///
/// The file is typically an export of the production spreadsheet that some
/// other process refreshes in place.
///
/// The source tracks the file's modification time and length and only
/// re-parses when either has changed; otherwise the cached rows are served.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_seen: Option<(SystemTime, u64)>,
    cached_rows: Option<Vec<ProductionRecord>>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_seen: None,
            cached_rows: None,
        }
    }

    /// Returns the path being monitored.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_error(&self, source: std::io::Error) -> SourceUnavailable {
        SourceUnavailable::Read {
            path: self.path.clone(),
            source,
        }
    }

    /// Read and parse the file.
    fn read_file(&self) -> Result<Vec<ProductionRecord>, SourceUnavailable> {
        let content = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        let payload: RowsPayload =
            serde_json::from_str(&content).map_err(|e| SourceUnavailable::Parse(e.to_string()))?;
        Ok(payload.into_rows())
    }
}

impl DataSource for FileSource {
    fn read_rows(&mut self) -> Result<Vec<ProductionRecord>, SourceUnavailable> {
        let metadata = fs::metadata(&self.path).map_err(|e| self.read_error(e))?;
        let current = metadata.modified().ok().map(|modified| (modified, metadata.len()));

        if let (Some(rows), Some(last), Some(current)) = (&self.cached_rows, self.last_seen, current)
        {
            if last == current {
                return Ok(rows.clone());
            }
        }

        let rows = self.read_file()?;
        self.last_seen = current;
        self.cached_rows = Some(rows.clone());
        Ok(rows)
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"[
            { "category": "Chocolate", "status": "OK" },
            { "category": "Chocolate", "status": "PENDING" },
            { "category": "Lemon", "status": "OK" }
        ]"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/rows.json");
        assert_eq!(source.path(), Path::new("/tmp/rows.json"));
        assert_eq!(source.description(), "file: /tmp/rows.json");
    }

    #[test]
    fn test_file_source_reads_rows() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        let rows = source.read_rows().unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[2], ProductionRecord::new("Lemon", "OK"));

        // Unchanged file is served from the cache with identical content
        let again = source.read_rows().unwrap();
        assert_eq!(rows, again);
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        assert_eq!(source.read_rows().unwrap().len(), 3);

        // Rewrite with a different length so the change is seen even when
        // the filesystem mtime resolution is coarse
        file.rewind().unwrap();
        file.as_file().set_len(0).unwrap();
        writeln!(file, r#"{{ "rows": [ {{ "category": "Vanilla", "status": "OK" }} ] }}"#).unwrap();
        file.flush().unwrap();

        let rows = source.read_rows().unwrap();
        assert_eq!(rows, vec![ProductionRecord::new("Vanilla", "OK")]);
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/rows.json");

        let err = source.read_rows().unwrap_err();
        assert!(matches!(err, SourceUnavailable::Read { .. }));
        assert!(err.to_string().contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        let err = source.read_rows().unwrap_err();
        assert!(matches!(err, SourceUnavailable::Parse(_)));
        assert!(err.to_string().contains("Parse error"));
    }

    #[test]
    fn test_file_source_reports_disappearance() {
        let file = NamedTempFile::new().unwrap();
        std::fs::write(file.path(), sample_json()).unwrap();

        let mut source = FileSource::new(file.path());
        assert!(source.read_rows().is_ok());

        let path = file.path().to_path_buf();
        drop(file);

        let mut source_after = source;
        assert_eq!(source_after.path(), path.as_path());
        assert!(source_after.read_rows().is_err());
    }
}
