//! Inverted token index for opsrecall.
//!
//! One [`InvertedIndex`] per record kind maps each normalized token to the
//! posting list of record identifiers containing it. Lookup returns, per
//! candidate, the number of **distinct** query tokens matched, which is the
//! primary signal fed to the relevance scorer. Built once per load from the record
//! store; queries never touch record text.

use std::collections::{BTreeSet, HashMap};

use opsrecall_core::records::RecordKind;
use opsrecall_core::tokenize::Tokenizer;
use opsrecall_store::Snapshot;
use tracing::debug;

/// Inverted index over one record kind.
///
/// Identifiers are interned into an arena; posting lists hold arena offsets,
/// sorted and deduplicated, so build order cannot influence lookups.
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    doc_ids: Vec<String>,
    postings: HashMap<String, Vec<u32>>,
}

impl InvertedIndex {
    /// Build an index from `(identifier, text)` pairs.
    ///
    /// Each record's text is normalized with the same tokenizer used at
    /// query time; the identifier joins the posting list of every token.
    #[must_use]
    pub fn build<'a, I>(docs: I, tokenizer: &Tokenizer) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut index = Self::default();
        for (id, text) in docs {
            index.insert(id, &tokenizer.normalize(text));
        }
        index.seal();
        index
    }

    /// Build directly from pre-tokenized token sets.
    #[must_use]
    pub fn build_from_tokens<'a, I>(docs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a BTreeSet<String>)>,
    {
        let mut index = Self::default();
        for (id, tokens) in docs {
            index.insert(id, tokens);
        }
        index.seal();
        index
    }

    fn insert(&mut self, id: &str, tokens: &BTreeSet<String>) {
        let offset = u32::try_from(self.doc_ids.len()).expect("record count exceeds u32 arena");
        self.doc_ids.push(id.to_string());
        for token in tokens {
            self.postings.entry(token.clone()).or_default().push(offset);
        }
    }

    fn seal(&mut self) {
        for list in self.postings.values_mut() {
            list.sort_unstable();
            list.dedup();
        }
    }

    /// Number of indexed records.
    #[must_use]
    pub const fn doc_count(&self) -> usize {
        self.doc_ids.len()
    }

    /// Number of distinct tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.postings.len()
    }

    /// For each record touched by any query token, count the distinct query
    /// tokens it matches.
    ///
    /// An empty query token set yields an empty result, never "match
    /// everything".
    #[must_use]
    pub fn lookup(&self, query_tokens: &BTreeSet<String>) -> HashMap<&str, usize> {
        let mut counts: HashMap<u32, usize> = HashMap::new();
        for token in query_tokens {
            if let Some(list) = self.postings.get(token) {
                for &offset in list {
                    *counts.entry(offset).or_insert(0) += 1;
                }
            }
        }
        counts
            .into_iter()
            .map(|(offset, count)| (self.doc_ids[offset as usize].as_str(), count))
            .collect()
    }
}

/// One inverted index per searchable record kind.
#[derive(Debug, Clone, Default)]
pub struct KindIndexes {
    indexes: HashMap<RecordKind, InvertedIndex>,
}

impl KindIndexes {
    /// Build all four indexes from a loaded snapshot, reusing the token sets
    /// the snapshot computed at assembly time.
    #[must_use]
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut indexes = HashMap::new();
        for kind in RecordKind::ALL {
            let index = InvertedIndex::build_from_tokens(
                snapshot.docs(kind).map(|doc| (doc.id.as_str(), &doc.tokens)),
            );
            debug!(
                target: "opsrecall.index",
                kind = %kind,
                doc_count = index.doc_count(),
                token_count = index.token_count(),
                "index built"
            );
            indexes.insert(kind, index);
        }
        Self { indexes }
    }

    /// The index for one kind. Every kind exists after `build`, possibly
    /// empty.
    #[must_use]
    pub fn for_kind(&self, kind: RecordKind) -> Option<&InvertedIndex> {
        self.indexes.get(&kind)
    }

    /// Candidate identifiers with distinct-token match counts, per kind.
    #[must_use]
    pub fn lookup(
        &self,
        kind: RecordKind,
        query_tokens: &BTreeSet<String>,
    ) -> HashMap<&str, usize> {
        self.indexes
            .get(&kind)
            .map(|index| index.lookup(query_tokens))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(ToString::to_string).collect()
    }

    fn sample_index() -> InvertedIndex {
        let tokenizer = Tokenizer::default();
        InvertedIndex::build(
            [
                ("INC-1", "database connection timeout on primary"),
                ("INC-2", "ui rendering bug after deploy"),
                ("INC-3", "timeout waiting for database lock"),
            ],
            &tokenizer,
        )
    }

    #[test]
    fn lookup_counts_distinct_query_tokens() {
        let index = sample_index();
        let hits = index.lookup(&tokens(&["database", "timeout"]));
        assert_eq!(hits.get("INC-1"), Some(&2));
        assert_eq!(hits.get("INC-3"), Some(&2));
        assert_eq!(hits.get("INC-2"), None);
    }

    #[test]
    fn lookup_has_no_false_positives() {
        let index = sample_index();
        let query = tokens(&["rendering"]);
        let hits = index.lookup(&query);
        assert_eq!(hits.len(), 1);
        assert!(hits.contains_key("INC-2"));
    }

    #[test]
    fn empty_query_matches_nothing() {
        let index = sample_index();
        assert!(index.lookup(&BTreeSet::new()).is_empty());
    }

    #[test]
    fn unknown_tokens_match_nothing() {
        let index = sample_index();
        assert!(index.lookup(&tokens(&["nonexistent"])).is_empty());
    }

    #[test]
    fn repeated_token_in_record_counts_once() {
        let tokenizer = Tokenizer::default();
        let index = InvertedIndex::build(
            [("INC-9", "timeout timeout timeout everywhere")],
            &tokenizer,
        );
        let hits = index.lookup(&tokens(&["timeout"]));
        assert_eq!(hits.get("INC-9"), Some(&1));
    }

    #[test]
    fn build_is_order_independent() {
        let tokenizer = Tokenizer::default();
        let docs = [
            ("a", "alpha beta gamma"),
            ("b", "beta gamma delta"),
            ("c", "gamma delta epsilon"),
        ];
        let forward = InvertedIndex::build(docs, &tokenizer);
        let mut reversed_docs = docs;
        reversed_docs.reverse();
        let reversed = InvertedIndex::build(reversed_docs, &tokenizer);

        for query in [
            tokens(&["beta"]),
            tokens(&["gamma", "delta"]),
            tokens(&["alpha", "epsilon"]),
        ] {
            let mut left: Vec<_> = forward.lookup(&query).into_iter().collect();
            let mut right: Vec<_> = reversed.lookup(&query).into_iter().collect();
            left.sort_unstable();
            right.sort_unstable();
            assert_eq!(left, right, "query {query:?} diverged");
        }
    }

    #[test]
    fn counts_reflect_index_sizes() {
        let index = sample_index();
        assert_eq!(index.doc_count(), 3);
        assert!(index.token_count() >= 8);
    }

    #[test]
    fn kind_indexes_cover_all_kinds() {
        use std::collections::BTreeMap;

        use opsrecall_core::records::{Comment, Incident, Issue};

        let tokenizer = Tokenizer::default();
        let mut incidents = BTreeMap::new();
        let incident = Incident::new("INC-1").with_symptom("connection timeout");
        incidents.insert(incident.id.clone(), incident);
        let mut issues = BTreeMap::new();
        let issue = Issue::new("OPS-1", "timeout in pool");
        issues.insert(issue.key.clone(), issue);
        let mut comments = BTreeMap::new();
        let comment = Comment::new("c-1", "OPS-1", "raised the timeout");
        comments.insert(comment.id.clone(), comment);

        let snapshot = Snapshot::assemble(
            incidents,
            issues,
            comments,
            BTreeMap::new(),
            Vec::new(),
            &tokenizer,
        );
        let indexes = KindIndexes::build(&snapshot);

        let query = tokens(&["timeout"]);
        assert_eq!(indexes.lookup(RecordKind::Incident, &query).len(), 1);
        assert_eq!(indexes.lookup(RecordKind::Issue, &query).len(), 1);
        assert_eq!(indexes.lookup(RecordKind::Comment, &query).len(), 1);
        assert!(indexes.lookup(RecordKind::Change, &query).is_empty());
        assert!(indexes.for_kind(RecordKind::Change).is_some());
    }
}
