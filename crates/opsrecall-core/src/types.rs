//! Request and result types for the public engine surface.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::records::RecordKind;

/// A retrieval request.
///
/// At least one of `text` (normalizing to a non-empty token set) or
/// `identifier` must be supplied; otherwise the engine rejects the query as
/// ambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Free-text question or symptom description.
    pub text: String,
    /// Optional seed identifier (incident id or issue key) for correlation.
    #[serde(default)]
    pub identifier: Option<String>,
    /// Restrict evidence to these kinds. `None` means all kinds.
    #[serde(default)]
    pub kind_filter: Option<BTreeSet<RecordKind>>,
    /// Maximum evidence entries to return. `None` means the configured
    /// default; values above the configured cap are clamped.
    #[serde(default)]
    pub limit: Option<usize>,
    /// Restrict evidence to resolved records: incidents with a non-empty
    /// resolution, issues in a terminal status.
    #[serde(default)]
    pub resolved_only: bool,
}

impl QueryRequest {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            identifier: None,
            kind_filter: None,
            limit: None,
            resolved_only: false,
        }
    }

    #[must_use]
    pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.identifier = Some(identifier.into());
        self
    }

    #[must_use]
    pub fn with_kinds<I: IntoIterator<Item = RecordKind>>(mut self, kinds: I) -> Self {
        self.kind_filter = Some(kinds.into_iter().collect());
        self
    }

    #[must_use]
    pub const fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub const fn resolved_only(mut self) -> Self {
        self.resolved_only = true;
        self
    }
}

/// One ranked, scored record returned in answer to a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evidence {
    /// Record identifier (incident id, issue key, comment id, change id).
    pub id: String,
    /// Which record kind this is.
    pub kind: RecordKind,
    /// Relevance score in [0, 1.5]. Values above 1.0 come from priority and
    /// recency boosts and are ordering signals, not probabilities.
    pub score: f64,
    /// Query tokens found in the record.
    pub matched_terms: BTreeSet<String>,
    /// Number of distinct query tokens matched.
    pub matched_term_count: usize,
    /// Leading characters of the record's searchable text.
    pub snippet: String,
    /// Record timestamp used for recency and tie-breaking, when known.
    pub timestamp: Option<DateTime<Utc>>,
}

impl Evidence {
    /// Four-level deterministic ranking:
    /// 1. Score descending
    /// 2. Matched term count descending
    /// 3. Timestamp descending (records without one sort last)
    /// 4. Identifier ascending (determinism fallback)
    #[must_use]
    pub fn cmp_for_ranking(&self, other: &Self) -> std::cmp::Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then(other.matched_term_count.cmp(&self.matched_term_count))
            .then_with(|| {
                let a = self.timestamp.map_or(i64::MIN, |ts| ts.timestamp());
                let b = other.timestamp.map_or(i64::MIN, |ts| ts.timestamp());
                b.cmp(&a)
            })
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// The ranked, confidence-tagged answer to a query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    /// Evidence in ranking order.
    pub evidence: Vec<Evidence>,
    /// Aggregate confidence in [0, 1] that the evidence answers the query.
    pub confidence: f64,
    /// True when more candidates existed than the limit allowed, or the
    /// correlation neighborhood was cut short by its result bound.
    pub truncated: bool,
    /// True when confidence fell below the configured threshold and the
    /// caller should consult an external source.
    pub fallback_recommended: bool,
}

/// Related records discovered by a correlation traversal, grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorrelationResult {
    /// Identifiers per kind, in discovery (breadth-first) order.
    pub related: BTreeMap<RecordKind, Vec<String>>,
    /// True when the result-count bound stopped the traversal before the
    /// full neighborhood was collected. Depth cutoff alone is not flagged.
    pub truncated: bool,
}

impl CorrelationResult {
    /// Total related records across all kinds.
    #[must_use]
    pub fn total(&self) -> usize {
        self.related.values().map(Vec::len).sum()
    }

    /// Whether a specific record was discovered.
    #[must_use]
    pub fn contains(&self, kind: RecordKind, id: &str) -> bool {
        self.related
            .get(&kind)
            .is_some_and(|ids| ids.iter().any(|found| found == id))
    }

    /// Whether the traversal found anything at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.related.values().all(Vec::is_empty)
    }
}

/// Outcome of a successful load: what was accepted and what was skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Accepted incidents.
    pub incidents: usize,
    /// Accepted issues.
    pub issues: usize,
    /// Accepted comments.
    pub comments: usize,
    /// Accepted change entries.
    pub changes: usize,
    /// Accepted links.
    pub links: usize,
    /// Rows skipped: malformed at the source or failing validation.
    pub skipped: usize,
    /// Total rows seen across all sources, accepted or not.
    pub total_rows: usize,
}

impl LoadReport {
    /// Accepted searchable records (links are structural and excluded).
    #[must_use]
    pub const fn searchable(&self) -> usize {
        self.incidents + self.issues + self.comments + self.changes
    }
}
