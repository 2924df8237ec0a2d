//! Engine configuration.
//!
//! [`EngineConfig`] carries every tuning knob for retrieval, scoring,
//! confidence estimation, correlation, and load tolerance. There is no
//! global or environment-driven state inside the engine itself: the config
//! is built explicitly and passed to the engine constructor. Defaults are
//! contractual; downstream consumers calibrate against them.

use serde::{Deserialize, Serialize};

use crate::error::{RecallError, RecallResult};

/// Configuration for the retrieval engine.
///
/// All fields have documented defaults. Override selectively via struct
/// update syntax or environment variables.
///
/// # Environment Variable Overrides
///
/// | Variable                            | Field                     | Default |
/// |-------------------------------------|---------------------------|---------|
/// | `OPSRECALL_HALF_LIFE_DAYS`          | `half_life_days`          | `90.0`  |
/// | `OPSRECALL_PRIORITY_WEIGHT_CAP`     | `priority_weight_cap`     | `1.3`   |
/// | `OPSRECALL_CONFIDENCE_THRESHOLD`    | `confidence_threshold`    | `0.30`  |
/// | `OPSRECALL_MAX_TRAVERSAL_DEPTH`     | `max_traversal_depth`     | `2`     |
/// | `OPSRECALL_MAX_CORRELATION_RESULTS` | `max_correlation_results` | `50`    |
/// | `OPSRECALL_MIN_TEXT_OVERLAP`        | `min_text_overlap`        | `3`     |
/// | `OPSRECALL_DEFAULT_QUERY_LIMIT`     | `default_query_limit`     | `20`    |
/// | `OPSRECALL_LOAD_SKIP_TOLERANCE`     | `load_skip_tolerance`     | `0.5`   |
/// | `OPSRECALL_MIN_RECORD_FLOOR`        | `min_record_floor`        | `1`     |
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Recency half-life in days. Records older than this start decaying.
    /// Default: 90.0.
    pub half_life_days: f64,

    /// Multiplicative boost for records no older than one half-life.
    /// Default: 1.1.
    pub recency_boost: f64,

    /// Lower bound on the recency factor; old records never decay below
    /// this fraction of their base score. Default: 0.5.
    pub recency_floor: f64,

    /// Maximum priority multiplier, reached at `Priority::Critical`.
    /// Default: 1.3.
    pub priority_weight_cap: f64,

    /// Confidence below this value signals the caller that local evidence
    /// is insufficient and an external fallback is warranted. Default: 0.30.
    pub confidence_threshold: f64,

    /// How many top-ranked scores feed the confidence estimate. Default: 5.
    pub confidence_top_k: usize,

    /// Number of distinct record kinds at which the coverage term
    /// saturates. Default: 3.
    pub coverage_saturation_kinds: usize,

    /// Weight of the score term in the confidence blend. Default: 0.8.
    pub confidence_score_weight: f64,

    /// Weight of the kind-coverage term in the confidence blend.
    /// Default: 0.2.
    pub confidence_coverage_weight: f64,

    /// Maximum correlation traversal depth. Default: 2.
    pub max_traversal_depth: usize,

    /// Maximum records a correlation may return. Default: 50.
    pub max_correlation_results: usize,

    /// Minimum shared tokens for an incident-to-issue/comment text-overlap
    /// edge. Default: 3.
    pub min_text_overlap: usize,

    /// Result limit applied when the caller does not supply one.
    /// Default: 20.
    pub default_query_limit: usize,

    /// Hard cap on any caller-supplied limit. Default: 100.
    pub max_query_limit: usize,

    /// Maximum snippet length in characters. Default: 200.
    pub max_snippet_chars: usize,

    /// Maximum tolerated fraction of skipped rows before a load fails
    /// outright. Default: 0.5.
    pub load_skip_tolerance: f64,

    /// Minimum searchable records a load must produce. Default: 1.
    pub min_record_floor: usize,

    /// Stop words appended to the fixed list.
    pub extra_stop_words: Vec<String>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            half_life_days: 90.0,
            recency_boost: 1.1,
            recency_floor: 0.5,
            priority_weight_cap: 1.3,
            confidence_threshold: 0.30,
            confidence_top_k: 5,
            coverage_saturation_kinds: 3,
            confidence_score_weight: 0.8,
            confidence_coverage_weight: 0.2,
            max_traversal_depth: 2,
            max_correlation_results: 50,
            min_text_overlap: 3,
            default_query_limit: 20,
            max_query_limit: 100,
            max_snippet_chars: 200,
            load_skip_tolerance: 0.5,
            min_record_floor: 1,
            extra_stop_words: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load overrides from environment variables.
    ///
    /// Only overrides fields for which environment variables are set.
    /// Invalid values are silently ignored (prior values are kept).
    #[must_use]
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(val) = std::env::var("OPSRECALL_HALF_LIFE_DAYS")
            && let Ok(days) = val.parse::<f64>()
            && days > 0.0
        {
            self.half_life_days = days;
        }
        if let Ok(val) = std::env::var("OPSRECALL_PRIORITY_WEIGHT_CAP")
            && let Ok(cap) = val.parse::<f64>()
            && cap >= 1.0
        {
            self.priority_weight_cap = cap;
        }
        if let Ok(val) = std::env::var("OPSRECALL_CONFIDENCE_THRESHOLD")
            && let Ok(threshold) = val.parse::<f64>()
            && (0.0..=1.0).contains(&threshold)
        {
            self.confidence_threshold = threshold;
        }
        if let Ok(val) = std::env::var("OPSRECALL_MAX_TRAVERSAL_DEPTH")
            && let Ok(depth) = val.parse::<usize>()
            && depth > 0
        {
            self.max_traversal_depth = depth;
        }
        if let Ok(val) = std::env::var("OPSRECALL_MAX_CORRELATION_RESULTS")
            && let Ok(max) = val.parse::<usize>()
            && max > 0
        {
            self.max_correlation_results = max;
        }
        if let Ok(val) = std::env::var("OPSRECALL_MIN_TEXT_OVERLAP")
            && let Ok(min) = val.parse::<usize>()
            && min > 0
        {
            self.min_text_overlap = min;
        }
        if let Ok(val) = std::env::var("OPSRECALL_DEFAULT_QUERY_LIMIT")
            && let Ok(limit) = val.parse::<usize>()
            && limit > 0
        {
            self.default_query_limit = limit;
        }
        if let Ok(val) = std::env::var("OPSRECALL_LOAD_SKIP_TOLERANCE")
            && let Ok(tolerance) = val.parse::<f64>()
            && (0.0..=1.0).contains(&tolerance)
        {
            self.load_skip_tolerance = tolerance;
        }
        if let Ok(val) = std::env::var("OPSRECALL_MIN_RECORD_FLOOR")
            && let Ok(floor) = val.parse::<usize>()
        {
            self.min_record_floor = floor;
        }
        self
    }

    /// Load configuration from a flat TOML file.
    ///
    /// Falls back to `Default::default()` if the file does not exist or
    /// cannot be parsed; keys absent from the file keep their defaults.
    #[must_use]
    pub fn from_file(path: &std::path::Path) -> Self {
        std::fs::read_to_string(path).map_or_else(
            |_| Self::default(),
            |contents| match toml::from_str::<Self>(&contents) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse config file, using defaults"
                    );
                    Self::default()
                }
            },
        )
    }

    /// Fail-closed structural validation, run by the engine constructor.
    ///
    /// # Errors
    ///
    /// Returns [`RecallError::InvalidConfig`] naming the first offending
    /// field.
    pub fn validate(&self) -> RecallResult<()> {
        if !(self.half_life_days.is_finite() && self.half_life_days > 0.0) {
            return Err(RecallError::invalid_config(
                "half_life_days",
                self.half_life_days.to_string(),
                "must be a positive, finite number of days",
            ));
        }
        if !(self.recency_floor.is_finite() && (0.0..=1.0).contains(&self.recency_floor)) {
            return Err(RecallError::invalid_config(
                "recency_floor",
                self.recency_floor.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }
        if !(self.recency_boost.is_finite() && self.recency_boost >= 1.0) {
            return Err(RecallError::invalid_config(
                "recency_boost",
                self.recency_boost.to_string(),
                "must be at least 1.0",
            ));
        }
        if !(self.priority_weight_cap.is_finite() && self.priority_weight_cap >= 1.0) {
            return Err(RecallError::invalid_config(
                "priority_weight_cap",
                self.priority_weight_cap.to_string(),
                "must be at least 1.0",
            ));
        }
        if !(0.0..=1.0).contains(&self.confidence_threshold) {
            return Err(RecallError::invalid_config(
                "confidence_threshold",
                self.confidence_threshold.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }
        for (name, value) in [
            ("confidence_score_weight", self.confidence_score_weight),
            ("confidence_coverage_weight", self.confidence_coverage_weight),
        ] {
            if !(value.is_finite() && (0.0..=1.0).contains(&value)) {
                return Err(RecallError::invalid_config(
                    name,
                    value.to_string(),
                    "must be between 0.0 and 1.0",
                ));
            }
        }
        if !(0.0..=1.0).contains(&self.load_skip_tolerance) {
            return Err(RecallError::invalid_config(
                "load_skip_tolerance",
                self.load_skip_tolerance.to_string(),
                "must be between 0.0 and 1.0",
            ));
        }
        for (name, value) in [
            ("confidence_top_k", self.confidence_top_k),
            ("coverage_saturation_kinds", self.coverage_saturation_kinds),
            ("max_traversal_depth", self.max_traversal_depth),
            ("max_correlation_results", self.max_correlation_results),
            ("min_text_overlap", self.min_text_overlap),
            ("default_query_limit", self.default_query_limit),
            ("max_query_limit", self.max_query_limit),
            ("max_snippet_chars", self.max_snippet_chars),
        ] {
            if value == 0 {
                return Err(RecallError::invalid_config(
                    name,
                    "0",
                    "must be greater than zero",
                ));
            }
        }
        if self.default_query_limit > self.max_query_limit {
            return Err(RecallError::invalid_config(
                "default_query_limit",
                self.default_query_limit.to_string(),
                "must not exceed max_query_limit",
            ));
        }
        Ok(())
    }
}
