//! Tracing conventions for opsrecall.
//!
//! Consumers bring their own subscriber; this module only fixes the target
//! prefix, span names, and structured field names so logs stay queryable
//! across the whole pipeline.
//!
//! ```text
//! RUST_LOG=opsrecall=debug
//! ```

use tracing::Level;

/// Target prefix used by all opsrecall tracing spans and events.
pub const TARGET_PREFIX: &str = "opsrecall";

/// Standard tracing span names used across the engine.
pub mod span_names {
    /// Root span for a retrieval query.
    pub const QUERY: &str = "opsrecall::query";
    /// Snapshot load and publication.
    pub const LOAD: &str = "opsrecall::load";
    /// Inverted index construction.
    pub const INDEX_BUILD: &str = "opsrecall::index_build";
    /// Cross-source correlation traversal.
    pub const CORRELATE: &str = "opsrecall::correlate";
    /// Knowledge-base summary computation.
    pub const SUMMARY: &str = "opsrecall::summary";
}

/// Standard structured field names used in tracing events.
pub mod field_names {
    pub const QUERY_LEN: &str = "query_len";
    pub const TOKEN_COUNT: &str = "token_count";
    pub const RESULT_COUNT: &str = "result_count";
    pub const RECORD_COUNT: &str = "record_count";
    pub const SKIPPED: &str = "skipped";
    pub const KIND: &str = "kind";
    pub const DEPTH: &str = "depth";
    pub const CONFIDENCE: &str = "confidence";
    pub const TRUNCATED: &str = "truncated";
    pub const LIMIT: &str = "limit";
}

/// Parse a log level string (case-insensitive).
///
/// Recognized values: `trace`, `debug`, `info`, `warn`, `error`.
/// Returns `None` for unrecognized strings.
#[must_use]
pub fn parse_level(s: &str) -> Option<Level> {
    match s.to_lowercase().as_str() {
        "trace" => Some(Level::TRACE),
        "debug" => Some(Level::DEBUG),
        "info" => Some(Level::INFO),
        "warn" => Some(Level::WARN),
        "error" => Some(Level::ERROR),
        _ => None,
    }
}

/// Returns the recommended `tracing::Level` for the given environment.
///
/// Checks `OPSRECALL_LOG_LEVEL` first, then falls back to the provided
/// default.
#[must_use]
pub fn level_from_env(default: Level) -> Level {
    std::env::var("OPSRECALL_LOG_LEVEL")
        .ok()
        .and_then(|s| parse_level(&s))
        .unwrap_or(default)
}
