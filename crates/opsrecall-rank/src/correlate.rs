//! Cross-source correlation.
//!
//! Bounded breadth-first traversal from a seed record over two edge
//! families:
//!
//! - **structural** — issue links (expanded in both directions regardless of
//!   stored direction), issue-to-comment/change ownership, and the reverse
//!   comment/change-to-owning-issue relation;
//! - **textual** — incident-to-issue/comment edges wherever the normalized
//!   token sets share at least `min_text_overlap` tokens.
//!
//! Both the depth and the result count are bounded, so traversal terminates
//! on any graph, cycles included. Hitting the result bound sets
//! `truncated`; running out of depth does not, since depth cutoff is the
//! configured horizon rather than a dropped result.

use std::collections::{HashSet, VecDeque};

use opsrecall_core::config::EngineConfig;
use opsrecall_core::records::RecordKind;
use opsrecall_core::tokenize::Tokenizer;
use opsrecall_core::types::CorrelationResult;
use opsrecall_store::Snapshot;
use tracing::debug;

/// Bounded breadth-first correlator over one snapshot.
#[derive(Debug)]
pub struct Correlator<'a> {
    snapshot: &'a Snapshot,
    max_depth: usize,
    max_results: usize,
    min_text_overlap: usize,
}

impl<'a> Correlator<'a> {
    #[must_use]
    pub fn from_config(snapshot: &'a Snapshot, config: &EngineConfig) -> Self {
        Self {
            snapshot,
            max_depth: config.max_traversal_depth,
            max_results: config.max_correlation_results,
            min_text_overlap: config.min_text_overlap,
        }
    }

    /// Assemble the bounded neighborhood of `identifier`.
    ///
    /// An unknown identifier yields an empty, non-truncated result:
    /// "not found" is data, not failure. The seed itself is never part of
    /// the result.
    #[must_use]
    pub fn correlate(&self, identifier: &str, kind: RecordKind) -> CorrelationResult {
        let mut result = CorrelationResult::default();
        if self.snapshot.doc(kind, identifier).is_none() {
            debug!(
                target: "opsrecall.correlate",
                %kind,
                identifier,
                "unknown seed, empty neighborhood"
            );
            return result;
        }

        let mut visited: HashSet<(RecordKind, String)> = HashSet::new();
        visited.insert((kind, identifier.to_string()));

        let mut queue: VecDeque<(RecordKind, String, usize)> = VecDeque::new();
        queue.push_back((kind, identifier.to_string(), 0));

        while let Some((node_kind, node_id, depth)) = queue.pop_front() {
            if depth >= self.max_depth {
                continue;
            }
            for (neighbor_kind, neighbor_id) in self.neighbors(node_kind, &node_id) {
                let key = (neighbor_kind, neighbor_id.clone());
                if visited.contains(&key) {
                    continue;
                }
                if result.total() >= self.max_results {
                    result.truncated = true;
                    debug!(
                        target: "opsrecall.correlate",
                        max_results = self.max_results,
                        "result bound hit, returning partial neighborhood"
                    );
                    return result;
                }
                visited.insert(key);
                result
                    .related
                    .entry(neighbor_kind)
                    .or_default()
                    .push(neighbor_id.clone());
                queue.push_back((neighbor_kind, neighbor_id, depth + 1));
            }
        }

        result
    }

    /// Direct neighbors of one node, in deterministic order.
    fn neighbors(&self, kind: RecordKind, id: &str) -> Vec<(RecordKind, String)> {
        let mut neighbors = Vec::new();
        match kind {
            RecordKind::Issue => {
                // Link edges both ways; endpoints that never loaded are
                // treated as absent.
                for edge in self.snapshot.link_edges(id) {
                    if self.snapshot.issue(&edge.neighbor).is_some() {
                        neighbors.push((RecordKind::Issue, edge.neighbor.clone()));
                    }
                }
                for comment_id in self.snapshot.comments_for(id) {
                    neighbors.push((RecordKind::Comment, comment_id.clone()));
                }
                for change_id in self.snapshot.changes_for(id) {
                    neighbors.push((RecordKind::Change, change_id.clone()));
                }
            }
            RecordKind::Incident => {
                let Some(seed_doc) = self.snapshot.doc(RecordKind::Incident, id) else {
                    return neighbors;
                };
                for target_kind in [RecordKind::Issue, RecordKind::Comment] {
                    for doc in self.snapshot.docs(target_kind) {
                        if Tokenizer::overlap(&seed_doc.tokens, &doc.tokens)
                            >= self.min_text_overlap
                        {
                            neighbors.push((target_kind, doc.id.clone()));
                        }
                    }
                }
            }
            RecordKind::Comment => {
                if let Some(comment) = self.snapshot.comment(id)
                    && self.snapshot.issue(&comment.issue_key).is_some()
                {
                    neighbors.push((RecordKind::Issue, comment.issue_key.clone()));
                }
            }
            RecordKind::Change => {
                if let Some(change) = self.snapshot.change(id)
                    && self.snapshot.issue(&change.issue_key).is_some()
                {
                    neighbors.push((RecordKind::Issue, change.issue_key.clone()));
                }
            }
        }
        neighbors
    }
}
