//! The retrieval engine façade.
//!
//! [`RecallEngine`] composes the record store, per-kind inverted indexes,
//! the relevance scorer, the confidence estimator, and the correlator
//! behind three calls: `load`, `query`, and `correlate`. The engine is a
//! plain synchronous library; concurrency is the caller's business.
//!
//! Reads are lock-free after a single pointer clone: each call grabs the
//! current snapshot `Arc` once and works on that immutable state for its
//! whole duration. `load` is the only writer: it builds the new snapshot
//! and indexes entirely off to the side and swaps the pointer on success,
//! so readers observe either the old state or the new one, never a mix.

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use opsrecall_core::config::EngineConfig;
use opsrecall_core::error::{RecallError, RecallResult};
use opsrecall_core::records::RecordKind;
use opsrecall_core::tokenize::Tokenizer;
use opsrecall_core::types::{
    CorrelationResult, Evidence, LoadReport, QueryRequest, QueryResult,
};
use opsrecall_index::KindIndexes;
use opsrecall_rank::{ConfidenceEstimator, Correlator, Scorer};
use opsrecall_store::{RecordSource, SearchDoc, Snapshot, SnapshotStats, load_snapshot};
use tracing::{debug, info, instrument};

use crate::report::KnowledgeBaseSummary;

/// A published snapshot with its query-time indexes.
#[derive(Debug)]
struct ReadySnapshot {
    snapshot: Snapshot,
    indexes: KindIndexes,
}

/// The public entry point of the retrieval engine.
pub struct RecallEngine {
    config: EngineConfig,
    tokenizer: Tokenizer,
    scorer: Scorer,
    estimator: ConfidenceEstimator,
    state: RwLock<Option<Arc<ReadySnapshot>>>,
}

impl RecallEngine {
    /// Create an engine with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RecallError::InvalidConfig`] when the configuration fails
    /// validation. Nothing is loaded yet; queries return
    /// [`RecallError::NotReady`] until the first successful [`load`](Self::load).
    pub fn new(config: EngineConfig) -> RecallResult<Self> {
        config.validate()?;
        let tokenizer = Tokenizer::with_extra_stop_words(&config.extra_stop_words);
        let scorer = Scorer::from_config(&config);
        let estimator = ConfidenceEstimator::from_config(&config);
        Ok(Self {
            config,
            tokenizer,
            scorer,
            estimator,
            state: RwLock::new(None),
        })
    }

    /// The engine's configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether a snapshot has been published.
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Record counts of the current snapshot.
    ///
    /// # Errors
    ///
    /// [`RecallError::NotReady`] before the first successful load.
    pub fn stats(&self) -> RecallResult<SnapshotStats> {
        Ok(self.current()?.snapshot.stats())
    }

    /// Load (or reload) the knowledge base from `sources`.
    ///
    /// The snapshot and its indexes are built before anything is published;
    /// on any error the previously published snapshot, if any, keeps
    /// serving untouched.
    ///
    /// # Errors
    ///
    /// See [`load_snapshot`] for the load-group errors.
    #[instrument(name = "opsrecall::load", skip_all, fields(sources = sources.len()))]
    pub fn load(&self, sources: &[Box<dyn RecordSource>]) -> RecallResult<LoadReport> {
        let (snapshot, report) = load_snapshot(sources, &self.config, &self.tokenizer)?;
        let indexes = KindIndexes::build(&snapshot);
        let ready = Arc::new(ReadySnapshot { snapshot, indexes });

        *self
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(ready);

        info!(
            target: "opsrecall.engine",
            record_count = report.searchable(),
            skipped = report.skipped,
            "snapshot published"
        );
        Ok(report)
    }

    /// Answer a retrieval query with ranked evidence and a confidence
    /// estimate.
    ///
    /// # Errors
    ///
    /// - [`RecallError::NotReady`] before the first successful load.
    /// - [`RecallError::InvalidQuery`] for a non-positive limit, or when the
    ///   text normalizes to no tokens and no identifier is given.
    #[instrument(
        name = "opsrecall::query",
        skip_all,
        fields(query_len = request.text.len(), limit = ?request.limit)
    )]
    pub fn query(&self, request: &QueryRequest) -> RecallResult<QueryResult> {
        let ready = self.current()?;

        let limit = match request.limit {
            None => self.config.default_query_limit,
            Some(0) => {
                return Err(RecallError::invalid_query("limit must be greater than zero"));
            }
            Some(n) => n.min(self.config.max_query_limit),
        };

        let query_tokens = self.tokenizer.normalize(&request.text);
        if query_tokens.is_empty() && request.identifier.is_none() {
            return Err(RecallError::invalid_query(
                "text normalizes to an empty token set and no identifier was given",
            ));
        }

        let kinds: Vec<RecordKind> = match &request.kind_filter {
            Some(filter) => RecordKind::ALL
                .into_iter()
                .filter(|kind| filter.contains(kind))
                .collect(),
            None => RecordKind::ALL.to_vec(),
        };

        let now = Utc::now();
        let mut merged: HashMap<(RecordKind, String), Evidence> = HashMap::new();

        // Lexical candidates: per-kind posting-list hits, resolved and
        // scored.
        for &kind in &kinds {
            for (id, _match_count) in ready.indexes.lookup(kind, &query_tokens) {
                let Some(doc) = ready.snapshot.doc(kind, id) else {
                    continue;
                };
                if request.resolved_only && !doc.resolved {
                    continue;
                }
                let evidence = self.evidence_for(doc, &query_tokens, now);
                merged.insert((kind, doc.id.clone()), evidence);
            }
        }

        // Correlated neighborhood: merged in, preferring the higher score
        // on conflict.
        let mut correlation_truncated = false;
        if let Some(identifier) = &request.identifier {
            let correlator = Correlator::from_config(&ready.snapshot, &self.config);
            if let Some(seed_kind) = self.seed_kind(&ready.snapshot, identifier) {
                let correlated = correlator.correlate(identifier, seed_kind);
                correlation_truncated = correlated.truncated;
                for (kind, ids) in &correlated.related {
                    if !kinds.contains(kind) {
                        continue;
                    }
                    for id in ids {
                        let Some(doc) = ready.snapshot.doc(*kind, id) else {
                            continue;
                        };
                        if request.resolved_only && !doc.resolved {
                            continue;
                        }
                        let evidence = self.evidence_for(doc, &query_tokens, now);
                        merged
                            .entry((*kind, id.clone()))
                            .and_modify(|existing| {
                                if evidence.score > existing.score {
                                    *existing = evidence.clone();
                                }
                            })
                            .or_insert(evidence);
                    }
                }
            } else {
                debug!(
                    target: "opsrecall.engine",
                    identifier = %identifier,
                    "identifier not found in any kind, lexical results only"
                );
            }
        }

        let mut evidence: Vec<Evidence> = merged.into_values().collect();
        evidence.sort_by(Evidence::cmp_for_ranking);
        let truncated = evidence.len() > limit || correlation_truncated;
        evidence.truncate(limit);

        let confidence = self.estimator.estimate(&evidence);
        let fallback_recommended = confidence < self.config.confidence_threshold;
        debug!(
            target: "opsrecall.engine",
            token_count = query_tokens.len(),
            result_count = evidence.len(),
            confidence,
            truncated,
            "query complete"
        );

        Ok(QueryResult {
            evidence,
            confidence,
            truncated,
            fallback_recommended,
        })
    }

    /// Assemble the bounded related-record neighborhood of `identifier`.
    ///
    /// An unknown identifier yields an empty result, not an error.
    ///
    /// # Errors
    ///
    /// [`RecallError::NotReady`] before the first successful load.
    #[instrument(name = "opsrecall::correlate", skip(self, kind), fields(kind = %kind))]
    pub fn correlate(
        &self,
        identifier: &str,
        kind: RecordKind,
    ) -> RecallResult<CorrelationResult> {
        let ready = self.current()?;
        let correlator = Correlator::from_config(&ready.snapshot, &self.config);
        Ok(correlator.correlate(identifier, kind))
    }

    /// Aggregate view of the loaded knowledge base: counts, date ranges,
    /// category and priority distributions.
    ///
    /// # Errors
    ///
    /// [`RecallError::NotReady`] before the first successful load.
    #[instrument(name = "opsrecall::summary", skip(self))]
    pub fn summary(&self) -> RecallResult<KnowledgeBaseSummary> {
        Ok(KnowledgeBaseSummary::compute(&self.current()?.snapshot))
    }

    fn current(&self) -> RecallResult<Arc<ReadySnapshot>> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(RecallError::NotReady)
    }

    /// The kind under which `identifier` exists, checked in canonical kind
    /// order.
    fn seed_kind(&self, snapshot: &Snapshot, identifier: &str) -> Option<RecordKind> {
        RecordKind::ALL
            .into_iter()
            .find(|&kind| snapshot.doc(kind, identifier).is_some())
    }

    fn evidence_for(
        &self,
        doc: &SearchDoc,
        query_tokens: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) -> Evidence {
        let scored = self.scorer.score(query_tokens, doc, now);
        Evidence {
            id: doc.id.clone(),
            kind: doc.kind,
            score: scored.score,
            matched_term_count: scored.matched_terms.len(),
            matched_terms: scored.matched_terms,
            snippet: snippet_of(&doc.text, self.config.max_snippet_chars),
            timestamp: doc.timestamp,
        }
    }
}

/// First `max_chars` characters of `text`, cut at a char boundary.
fn snippet_of(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    text.chars().take(max_chars).collect()
}
