//! Record sources feeding the load pipeline.
//!
//! A [`RecordSource`] hands the loader a batch of already-typed records plus
//! a count of rows it could not even parse. Row-level parsing failures are
//! data quality, not fatal errors: the loader weighs them against the
//! configured skip tolerance. Only a wholly unreadable source (missing file,
//! I/O failure) aborts the load.

use std::path::{Path, PathBuf};

use opsrecall_core::error::{RecallError, RecallResult};
use opsrecall_core::records::{ChangeEntry, Comment, Incident, Issue, Link};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// One typed row from any source, tagged by record kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Incident(Incident),
    Issue(Issue),
    Comment(Comment),
    Change(ChangeEntry),
    Link(Link),
}

/// Everything one source produced: parsed records and the count of rows
/// that failed to parse.
#[derive(Debug, Clone, Default)]
pub struct SourceBatch {
    /// Successfully parsed records, in source order.
    pub records: Vec<SourceRecord>,
    /// Rows that could not be parsed into any record type.
    pub malformed: usize,
}

/// A provider of typed records for the load pass.
///
/// Implementations own the external format (file layout, delimiters,
/// column names); the engine only ever sees typed records.
pub trait RecordSource: Send + Sync {
    /// Stable name used in error messages and logs.
    fn name(&self) -> &str;

    /// Read the entire source.
    ///
    /// # Errors
    ///
    /// [`RecallError::SourceMissing`] when the backing data does not exist,
    /// [`RecallError::Io`] when it exists but cannot be read.
    fn read(&self) -> RecallResult<SourceBatch>;
}

/// Newline-delimited JSON source: one tagged [`SourceRecord`] per line.
///
/// Blank lines are ignored; unparseable lines are counted as malformed and
/// skipped.
#[derive(Debug, Clone)]
pub struct JsonlSource {
    name: String,
    path: PathBuf,
}

impl JsonlSource {
    #[must_use]
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }

    /// Path this source reads from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordSource for JsonlSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> RecallResult<SourceBatch> {
        if !self.path.exists() {
            return Err(RecallError::SourceMissing {
                source_name: self.name.clone(),
                path: self.path.clone(),
            });
        }
        let contents = std::fs::read_to_string(&self.path)?;

        let mut batch = SourceBatch::default();
        for (line_no, line) in contents.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match serde_json::from_str::<SourceRecord>(line) {
                Ok(record) => batch.records.push(record),
                Err(e) => {
                    batch.malformed += 1;
                    debug!(
                        target: "opsrecall.load",
                        source = %self.name,
                        line = line_no + 1,
                        error = %e,
                        "skipping malformed row"
                    );
                }
            }
        }
        Ok(batch)
    }
}

/// In-memory source for tests and callers that already hold typed records.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    records: Vec<SourceRecord>,
}

impl MemorySource {
    #[must_use]
    pub fn new(name: impl Into<String>, records: Vec<SourceRecord>) -> Self {
        Self {
            name: name.into(),
            records,
        }
    }
}

impl RecordSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> RecallResult<SourceBatch> {
        Ok(SourceBatch {
            records: self.records.clone(),
            malformed: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn source_record_tagged_serde() {
        let record = SourceRecord::Incident(Incident::new("INC-1").with_category("network"));
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"kind\":\"incident\""));
        let decoded: SourceRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, record);
    }

    #[test]
    fn jsonl_source_reads_mixed_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            r#"{{"kind":"incident","id":"INC-1","opened":null,"closed":null,"priority":"high","category":"db","symptom":"timeout","resolution":"","status":"open"}}"#
        )
        .unwrap();
        writeln!(file).unwrap();
        writeln!(
            file,
            r#"{{"kind":"link","from_key":"OPS-1","to_key":"OPS-2","link_type":"blocks"}}"#
        )
        .unwrap();

        let source = JsonlSource::new("mixed", &path);
        let batch = source.read().unwrap();
        assert_eq!(batch.records.len(), 2);
        assert_eq!(batch.malformed, 0);
        assert!(matches!(batch.records[0], SourceRecord::Incident(_)));
        assert!(matches!(batch.records[1], SourceRecord::Link(_)));
    }

    #[test]
    fn jsonl_source_counts_malformed_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("records.jsonl");
        std::fs::write(
            &path,
            "not json at all\n{\"kind\":\"comment\",\"id\":\"c1\",\"issue_key\":\"OPS-1\",\"author\":\"a\",\"body\":\"b\",\"created\":null}\n{\"kind\":\"mystery\"}\n",
        )
        .unwrap();

        let batch = JsonlSource::new("dirty", &path).read().unwrap();
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.malformed, 2);
    }

    #[test]
    fn jsonl_source_missing_file_is_structured_error() {
        let source = JsonlSource::new("ghost", "/nonexistent/records.jsonl");
        let err = source.read().unwrap_err();
        assert!(matches!(err, RecallError::SourceMissing { .. }));
        assert!(err.to_string().contains("ghost"));
    }

    #[test]
    fn memory_source_round_trips_records() {
        let records = vec![SourceRecord::Issue(Issue::new("OPS-1", "summary"))];
        let source = MemorySource::new("inline", records.clone());
        let batch = source.read().unwrap();
        assert_eq!(batch.records, records);
        assert_eq!(batch.malformed, 0);
        assert_eq!(source.name(), "inline");
    }
}
