//! Aggregate confidence estimation.
//!
//! Turns a ranked evidence list into a single [0, 1] estimate of whether
//! the local knowledge base answers the query, blending two signals:
//!
//! - **score term** — the mean of the top-k scores (each clamped to 1.0),
//!   pushed through the saturation curve `s·(2−s)` so a handful of strong
//!   hits approaches 1.0 while a lone weak hit stays small;
//! - **coverage term** — distinct record kinds represented, saturating at
//!   `coverage_saturation_kinds`, rewarding corroboration across sources.
//!
//! The caller compares the estimate against the configured decision
//! threshold (default 0.30) to choose between answering locally and
//! recommending an external fallback.

use std::collections::BTreeSet;

use opsrecall_core::config::EngineConfig;
use opsrecall_core::types::Evidence;

/// Stateless estimator configured once per engine.
#[derive(Debug, Clone)]
pub struct ConfidenceEstimator {
    top_k: usize,
    coverage_saturation_kinds: usize,
    score_weight: f64,
    coverage_weight: f64,
}

impl ConfidenceEstimator {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            top_k: config.confidence_top_k,
            coverage_saturation_kinds: config.coverage_saturation_kinds,
            score_weight: config.confidence_score_weight,
            coverage_weight: config.confidence_coverage_weight,
        }
    }

    /// Estimate confidence for a ranked evidence list.
    ///
    /// Empty evidence yields 0.0. The estimate is monotone in the evidence:
    /// appending another relevant record never lowers it.
    #[must_use]
    pub fn estimate(&self, evidence: &[Evidence]) -> f64 {
        if evidence.is_empty() {
            return 0.0;
        }

        let mut scores: Vec<f64> = evidence.iter().map(|e| e.score.min(1.0)).collect();
        scores.sort_unstable_by(|a, b| b.total_cmp(a));
        let top_sum: f64 = scores.iter().take(self.top_k).sum();
        let mean = top_sum / self.top_k as f64;
        let saturated = mean * (2.0 - mean);

        let kinds: BTreeSet<_> = evidence.iter().map(|e| e.kind).collect();
        let coverage = (kinds.len() as f64 / self.coverage_saturation_kinds as f64).min(1.0);

        (self.score_weight * saturated + self.coverage_weight * coverage).clamp(0.0, 1.0)
    }
}
