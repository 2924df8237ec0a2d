use std::path::PathBuf;

/// Unified error type covering all failure modes of the opsrecall retrieval
/// engine.
///
/// Every variant carries an actionable message guiding the consumer toward
/// resolution. Load-group variants are fatal to the load operation only: a
/// previously published snapshot keeps serving. `InvalidQuery` is a caller
/// error and not retryable; `NotReady` is retryable once a load succeeds.
#[derive(Debug, thiserror::Error)]
pub enum RecallError {
    // === Load errors ===
    /// A configured record source does not exist.
    #[error("Source {source_name} missing at {path}. Check the data directory or remove the source.")]
    SourceMissing {
        /// Name of the source as registered with the loader.
        source_name: String,
        /// Path that was attempted.
        path: PathBuf,
    },

    /// A record source exists but could not be read at all.
    #[error("Source {source_name} malformed beyond tolerance: {detail}")]
    SourceMalformed {
        /// Name of the offending source.
        source_name: String,
        /// What went wrong.
        detail: String,
    },

    /// Too many rows were skipped during load.
    ///
    /// Prevents silently serving a near-empty knowledge base from a mostly
    /// corrupt source.
    #[error(
        "Load aborted: {skipped}/{total} rows skipped exceeds tolerance {tolerance:.2}. Prior snapshot (if any) keeps serving."
    )]
    SkipRatioExceeded {
        /// Rows skipped (malformed or failing validation).
        skipped: usize,
        /// Total rows seen across all sources.
        total: usize,
        /// Configured `load_skip_tolerance`.
        tolerance: f64,
    },

    /// The load produced fewer searchable records than the sanity floor.
    #[error(
        "Load produced {accepted} searchable records, below the floor of {floor}. Check source contents or lower min_record_floor."
    )]
    RecordFloor {
        /// Searchable records accepted by the load.
        accepted: usize,
        /// Configured `min_record_floor`.
        floor: usize,
    },

    // === Query errors ===
    /// The query is ambiguous or malformed; retrying unchanged will not help.
    #[error("Invalid query: {reason}")]
    InvalidQuery {
        /// Why the query was rejected.
        reason: String,
    },

    /// A query arrived before the first successful load.
    #[error("Knowledge base not ready: no snapshot has been loaded yet. Retry after load() succeeds.")]
    NotReady,

    // === Configuration errors ===
    /// A configuration value is invalid.
    #[error("Invalid config: {field} = \"{value}\" — {reason}")]
    InvalidConfig {
        /// Which config field.
        field: String,
        /// The invalid value.
        value: String,
        /// Why it is invalid.
        reason: String,
    },

    // === I/O errors ===
    /// Wraps `std::io::Error` for source file operations.
    #[error("I/O error: {0}. Check file permissions and paths.")]
    Io(#[from] std::io::Error),
}

impl RecallError {
    /// Shorthand for an [`RecallError::InvalidQuery`].
    pub fn invalid_query(reason: impl Into<String>) -> Self {
        Self::InvalidQuery {
            reason: reason.into(),
        }
    }

    /// Shorthand for an [`RecallError::InvalidConfig`].
    pub fn invalid_config(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the opsrecall crate hierarchy.
pub type RecallResult<T> = Result<T, RecallError>;
