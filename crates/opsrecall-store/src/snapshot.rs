//! Immutable loaded state of the knowledge base.
//!
//! A [`Snapshot`] is assembled once by the load pass and never mutated.
//! Reload produces a whole new snapshot; publication is the caller's
//! pointer swap. Everything derived (per-record search documents, comment
//! and change ordering, link adjacency) is computed here at assembly time
//! so queries touch only ready-made structures.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use chrono::{DateTime, Utc};
use opsrecall_core::records::{
    ChangeEntry, Comment, Incident, Issue, Link, LinkType, Priority, RecordKind,
};
use opsrecall_core::tokenize::Tokenizer;
use serde::{Deserialize, Serialize};

/// Searchable view of one record: the normalized token set plus the
/// structured fields scoring needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchDoc {
    /// Record identifier.
    pub id: String,
    /// Record kind.
    pub kind: RecordKind,
    /// Concatenated text-bearing fields (snippet source).
    pub text: String,
    /// Normalized token set of `text`.
    pub tokens: BTreeSet<String>,
    /// Timestamp for recency scoring, when known.
    pub timestamp: Option<DateTime<Utc>>,
    /// Declared priority, for kinds that carry one.
    pub priority: Option<Priority>,
    /// Whether the record is in a resolved/terminal state (incidents with a
    /// resolution, issues in a terminal status; true for other kinds).
    pub resolved: bool,
}

/// One traversable link edge, pre-expanded in both directions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEdge {
    /// Issue key on the far end.
    pub neighbor: String,
    /// Stored link type.
    pub link_type: LinkType,
    /// True when this edge follows the stored direction, false when it is
    /// the implied reverse reading.
    pub outgoing: bool,
}

/// Per-kind record counts of a snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotStats {
    pub incidents: usize,
    pub issues: usize,
    pub comments: usize,
    pub changes: usize,
    pub links: usize,
}

impl SnapshotStats {
    /// Total searchable records (links excluded).
    #[must_use]
    pub const fn searchable(&self) -> usize {
        self.incidents + self.issues + self.comments + self.changes
    }
}

/// One complete, immutable loaded state of the record store.
#[derive(Debug, Default)]
pub struct Snapshot {
    incidents: BTreeMap<String, Incident>,
    issues: BTreeMap<String, Issue>,
    comments: BTreeMap<String, Comment>,
    changes: BTreeMap<String, ChangeEntry>,
    links: Vec<Link>,

    // Derived at assembly time.
    docs: BTreeMap<RecordKind, BTreeMap<String, SearchDoc>>,
    comments_by_issue: HashMap<String, Vec<String>>,
    changes_by_issue: HashMap<String, Vec<String>>,
    link_edges: HashMap<String, Vec<LinkEdge>>,
}

impl Snapshot {
    /// Assemble a snapshot from fully validated tables.
    ///
    /// Comment and change orderings, link adjacency, and per-record search
    /// documents are computed here with the supplied tokenizer, the same
    /// instance later used for querying.
    #[must_use]
    pub fn assemble(
        incidents: BTreeMap<String, Incident>,
        issues: BTreeMap<String, Issue>,
        comments: BTreeMap<String, Comment>,
        changes: BTreeMap<String, ChangeEntry>,
        links: Vec<Link>,
        tokenizer: &Tokenizer,
    ) -> Self {
        let mut snapshot = Self {
            incidents,
            issues,
            comments,
            changes,
            links,
            ..Self::default()
        };

        let mut incident_docs = BTreeMap::new();
        for (id, incident) in &snapshot.incidents {
            let text = incident.search_text();
            incident_docs.insert(
                id.clone(),
                SearchDoc {
                    id: id.clone(),
                    kind: RecordKind::Incident,
                    tokens: tokenizer.normalize(&text),
                    text,
                    timestamp: incident.timestamp(),
                    priority: Some(incident.priority),
                    resolved: !incident.resolution.trim().is_empty(),
                },
            );
        }
        snapshot.docs.insert(RecordKind::Incident, incident_docs);

        let mut issue_docs = BTreeMap::new();
        for (key, issue) in &snapshot.issues {
            let text = issue.search_text();
            issue_docs.insert(
                key.clone(),
                SearchDoc {
                    id: key.clone(),
                    kind: RecordKind::Issue,
                    tokens: tokenizer.normalize(&text),
                    text,
                    timestamp: issue.timestamp(),
                    priority: Some(issue.priority),
                    resolved: issue.is_resolved(),
                },
            );
        }
        snapshot.docs.insert(RecordKind::Issue, issue_docs);

        let mut comment_docs = BTreeMap::new();
        for (id, comment) in &snapshot.comments {
            let text = comment.search_text();
            comment_docs.insert(
                id.clone(),
                SearchDoc {
                    id: id.clone(),
                    kind: RecordKind::Comment,
                    tokens: tokenizer.normalize(&text),
                    text,
                    timestamp: comment.timestamp(),
                    priority: None,
                    resolved: true,
                },
            );
            snapshot
                .comments_by_issue
                .entry(comment.issue_key.clone())
                .or_default()
                .push(id.clone());
        }
        snapshot.docs.insert(RecordKind::Comment, comment_docs);

        let mut change_docs = BTreeMap::new();
        for (id, change) in &snapshot.changes {
            let text = change.search_text();
            change_docs.insert(
                id.clone(),
                SearchDoc {
                    id: id.clone(),
                    kind: RecordKind::Change,
                    tokens: tokenizer.normalize(&text),
                    text,
                    timestamp: change.timestamp(),
                    priority: None,
                    resolved: true,
                },
            );
            snapshot
                .changes_by_issue
                .entry(change.issue_key.clone())
                .or_default()
                .push(id.clone());
        }
        snapshot.docs.insert(RecordKind::Change, change_docs);

        // Comments order within an issue by timestamp ascending; missing
        // timestamps first, then identifier.
        for ids in snapshot.comments_by_issue.values_mut() {
            ids.sort_by(|a, b| {
                let ta = snapshot.comments[a].created.map_or(i64::MIN, |t| t.timestamp());
                let tb = snapshot.comments[b].created.map_or(i64::MIN, |t| t.timestamp());
                ta.cmp(&tb).then_with(|| a.cmp(b))
            });
        }
        for ids in snapshot.changes_by_issue.values_mut() {
            ids.sort_by(|a, b| {
                let ta = snapshot.changes[a].created.map_or(i64::MIN, |t| t.timestamp());
                let tb = snapshot.changes[b].created.map_or(i64::MIN, |t| t.timestamp());
                ta.cmp(&tb).then_with(|| a.cmp(b))
            });
        }

        // Expand each stored link into edges on both endpoints; the reverse
        // reading keeps the stored type with `outgoing = false`.
        for link in &snapshot.links {
            snapshot
                .link_edges
                .entry(link.from_key.clone())
                .or_default()
                .push(LinkEdge {
                    neighbor: link.to_key.clone(),
                    link_type: link.link_type,
                    outgoing: true,
                });
            snapshot
                .link_edges
                .entry(link.to_key.clone())
                .or_default()
                .push(LinkEdge {
                    neighbor: link.from_key.clone(),
                    link_type: link.link_type,
                    outgoing: false,
                });
        }

        snapshot
    }

    // ─── Lookup ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn incident(&self, id: &str) -> Option<&Incident> {
        self.incidents.get(id)
    }

    #[must_use]
    pub fn issue(&self, key: &str) -> Option<&Issue> {
        self.issues.get(key)
    }

    #[must_use]
    pub fn comment(&self, id: &str) -> Option<&Comment> {
        self.comments.get(id)
    }

    #[must_use]
    pub fn change(&self, id: &str) -> Option<&ChangeEntry> {
        self.changes.get(id)
    }

    /// Searchable view of a record, if it exists.
    #[must_use]
    pub fn doc(&self, kind: RecordKind, id: &str) -> Option<&SearchDoc> {
        self.docs.get(&kind).and_then(|table| table.get(id))
    }

    /// All searchable views of one kind, in identifier order.
    pub fn docs(&self, kind: RecordKind) -> impl Iterator<Item = &SearchDoc> {
        self.docs.get(&kind).into_iter().flat_map(BTreeMap::values)
    }

    // ─── Iteration ──────────────────────────────────────────────────────

    pub fn incidents(&self) -> impl Iterator<Item = &Incident> {
        self.incidents.values()
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.issues.values()
    }

    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.links.iter()
    }

    // ─── Relations ──────────────────────────────────────────────────────

    /// Comment identifiers for an issue, ordered by timestamp ascending.
    /// Unknown issues yield the empty slice.
    #[must_use]
    pub fn comments_for(&self, issue_key: &str) -> &[String] {
        self.comments_by_issue
            .get(issue_key)
            .map_or(&[], Vec::as_slice)
    }

    /// Change identifiers for an issue, ordered by timestamp ascending.
    #[must_use]
    pub fn changes_for(&self, issue_key: &str) -> &[String] {
        self.changes_by_issue
            .get(issue_key)
            .map_or(&[], Vec::as_slice)
    }

    /// Link edges touching an issue, both directions. Unknown issues yield
    /// the empty slice.
    #[must_use]
    pub fn link_edges(&self, issue_key: &str) -> &[LinkEdge] {
        self.link_edges.get(issue_key).map_or(&[], Vec::as_slice)
    }

    /// Per-kind record counts.
    #[must_use]
    pub fn stats(&self) -> SnapshotStats {
        SnapshotStats {
            incidents: self.incidents.len(),
            issues: self.issues.len(),
            comments: self.comments.len(),
            changes: self.changes.len(),
            links: self.links.len(),
        }
    }

    /// Whether the snapshot holds no searchable records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stats().searchable() == 0
    }
}
