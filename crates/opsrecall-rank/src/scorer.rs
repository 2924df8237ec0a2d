//! Relevance scoring.
//!
//! The score of a candidate against a query is a token-overlap ratio
//! adjusted by recency and priority:
//!
//! ```text
//! base     = |matched| / max(1, |query_tokens|)          ∈ [0, 1]
//! recency  = boost (age ≤ half-life)
//!          | clamp(2^(1 − age/half_life), floor, 1.0)    otherwise
//! priority = linear in declared priority, up to the cap
//! score    = clamp(base × recency × priority, 0, 1.5)
//! ```
//!
//! Scores above 1.0 are tie-breaking signals from the boosts, never
//! probabilities.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use opsrecall_core::config::EngineConfig;
use opsrecall_store::SearchDoc;

const SECONDS_PER_DAY: f64 = 86_400.0;

/// Upper clamp on the final score.
const MAX_SCORE: f64 = 1.5;

/// Outcome of scoring one candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct Scored {
    /// Final relevance score in [0, 1.5].
    pub score: f64,
    /// Query tokens found in the candidate.
    pub matched_terms: BTreeSet<String>,
}

impl Scored {
    /// Number of distinct query tokens matched.
    #[must_use]
    pub fn matched_term_count(&self) -> usize {
        self.matched_terms.len()
    }
}

/// Stateless scorer configured once per engine.
#[derive(Debug, Clone)]
pub struct Scorer {
    half_life_days: f64,
    recency_boost: f64,
    recency_floor: f64,
    priority_weight_cap: f64,
}

impl Scorer {
    #[must_use]
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            half_life_days: config.half_life_days,
            recency_boost: config.recency_boost,
            recency_floor: config.recency_floor,
            priority_weight_cap: config.priority_weight_cap,
        }
    }

    /// Score `candidate` against `query_tokens` as of `now`.
    ///
    /// `now` is supplied by the caller so scoring stays deterministic in
    /// tests and consistent across one query's candidates.
    #[must_use]
    pub fn score(
        &self,
        query_tokens: &BTreeSet<String>,
        candidate: &SearchDoc,
        now: DateTime<Utc>,
    ) -> Scored {
        let matched_terms: BTreeSet<String> = query_tokens
            .iter()
            .filter(|token| candidate.tokens.contains(*token))
            .cloned()
            .collect();

        let base = matched_terms.len() as f64 / query_tokens.len().max(1) as f64;
        let recency = self.recency_factor(candidate.timestamp, now);
        let priority = candidate
            .priority
            .map_or(1.0, |p| p.weight(self.priority_weight_cap));

        let score = (base * recency * priority).clamp(0.0, MAX_SCORE);
        Scored {
            score,
            matched_terms,
        }
    }

    /// Recency multiplier for a record timestamp.
    ///
    /// Records without a timestamp are neutral (1.0). Future timestamps are
    /// treated as current.
    #[must_use]
    pub fn recency_factor(&self, timestamp: Option<DateTime<Utc>>, now: DateTime<Utc>) -> f64 {
        let Some(timestamp) = timestamp else {
            return 1.0;
        };
        let age_days = (now - timestamp).num_seconds() as f64 / SECONDS_PER_DAY;
        if age_days <= self.half_life_days {
            return self.recency_boost;
        }
        let decay = (1.0 - age_days / self.half_life_days).exp2();
        decay.clamp(self.recency_floor, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use opsrecall_core::records::{Priority, RecordKind};
    use opsrecall_core::tokenize::Tokenizer;

    use super::*;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000, 0).unwrap()
    }

    fn days_ago(days: f64) -> DateTime<Utc> {
        now() - chrono::Duration::seconds((days * SECONDS_PER_DAY) as i64)
    }

    fn doc(text: &str, timestamp: Option<DateTime<Utc>>, priority: Option<Priority>) -> SearchDoc {
        let tokenizer = Tokenizer::default();
        SearchDoc {
            id: "doc-1".into(),
            kind: RecordKind::Incident,
            tokens: tokenizer.normalize(text),
            text: text.into(),
            timestamp,
            priority,
            resolved: true,
        }
    }

    fn scorer() -> Scorer {
        Scorer::from_config(&EngineConfig::default())
    }

    fn query(text: &str) -> BTreeSet<String> {
        Tokenizer::default().normalize(text)
    }

    #[test]
    fn base_is_token_overlap_ratio() {
        // No timestamp, no priority boost beyond Low: pure base.
        let scored = scorer().score(
            &query("database connection timeout"),
            &doc("connection timeout due to network config", None, None),
            now(),
        );
        assert_eq!(scored.matched_term_count(), 2);
        assert!((scored.score - 2.0 / 3.0).abs() < 1e-12);
        assert!(scored.matched_terms.contains("connection"));
        assert!(scored.matched_terms.contains("timeout"));
    }

    #[test]
    fn no_overlap_scores_zero() {
        let scored = scorer().score(
            &query("database timeout"),
            &doc("ui rendering bug", None, None),
            now(),
        );
        assert!(scored.score.abs() < f64::EPSILON);
        assert!(scored.matched_terms.is_empty());
    }

    #[test]
    fn empty_query_scores_zero_without_dividing_by_zero() {
        let scored = scorer().score(&BTreeSet::new(), &doc("anything", None, None), now());
        assert!(scored.score.abs() < f64::EPSILON);
    }

    #[test]
    fn recent_records_get_boost() {
        let factor = scorer().recency_factor(Some(days_ago(10.0)), now());
        assert!((factor - 1.1).abs() < 1e-12);
    }

    #[test]
    fn boundary_age_still_boosted() {
        let factor = scorer().recency_factor(Some(days_ago(90.0)), now());
        assert!((factor - 1.1).abs() < 1e-12);
    }

    #[test]
    fn old_records_decay_to_floor_but_never_below() {
        let s = scorer();
        // Two half-lives: 2^(1-2) = 0.5, exactly the floor.
        let at_floor = s.recency_factor(Some(days_ago(180.0)), now());
        assert!((at_floor - 0.5).abs() < 1e-9);
        // Far older: clamped at the floor.
        let ancient = s.recency_factor(Some(days_ago(3_650.0)), now());
        assert!((ancient - 0.5).abs() < 1e-12);
    }

    #[test]
    fn decay_is_monotonic_between_boost_and_floor() {
        let s = scorer();
        let at_120 = s.recency_factor(Some(days_ago(120.0)), now());
        let at_150 = s.recency_factor(Some(days_ago(150.0)), now());
        assert!(at_120 > at_150);
        assert!(at_120 < 1.0);
        assert!(at_150 > 0.5);
    }

    #[test]
    fn missing_timestamp_is_neutral() {
        assert!((scorer().recency_factor(None, now()) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn future_timestamp_counts_as_current() {
        let factor = scorer().recency_factor(Some(now() + chrono::Duration::days(5)), now());
        assert!((factor - 1.1).abs() < 1e-12);
    }

    #[test]
    fn priority_multiplies_upward() {
        let q = query("timeout");
        let low = scorer().score(&q, &doc("timeout", None, Some(Priority::Low)), now());
        let critical = scorer().score(&q, &doc("timeout", None, Some(Priority::Critical)), now());
        assert!((low.score - 1.0).abs() < 1e-12);
        assert!((critical.score - 1.3).abs() < 1e-12);
    }

    #[test]
    fn score_clamped_to_max() {
        // Full overlap + recency boost + critical priority: 1.0 * 1.1 * 1.3
        // = 1.43, inside the clamp; widen the cap to force clamping.
        let config = EngineConfig {
            priority_weight_cap: 1.6,
            ..Default::default()
        };
        let s = Scorer::from_config(&config);
        let scored = s.score(
            &query("timeout"),
            &doc("timeout", Some(days_ago(1.0)), Some(Priority::Critical)),
            now(),
        );
        assert!((scored.score - 1.5).abs() < 1e-12);
    }

    #[test]
    fn score_never_exceeds_bounds_across_inputs() {
        let s = scorer();
        let q = query("database connection timeout retry");
        for age in [0.0, 45.0, 90.0, 180.0, 720.0] {
            for priority in [None, Some(Priority::Medium), Some(Priority::Critical)] {
                let scored = s.score(
                    &q,
                    &doc("database connection timeout retry", Some(days_ago(age)), priority),
                    now(),
                );
                assert!((0.0..=1.5).contains(&scored.score));
            }
        }
    }
}
