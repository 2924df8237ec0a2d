//! Text normalization for indexing and querying.
//!
//! The pipeline is deliberately small: NFC Unicode normalization, lowercase
//! folding, splitting on non-alphanumeric characters, dropping tokens shorter
//! than two characters, and dropping stop words. This module is the only
//! place normalization logic lives: index build, query parsing, and overlap
//! correlation all call the same [`Tokenizer`], so the indexed and queried
//! vocabularies can never diverge.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

/// Minimum token length in characters. Shorter tokens are discarded.
const MIN_TOKEN_CHARS: usize = 2;

/// Common English function words removed from every token set.
const STOP_WORDS: &[&str] = &[
    "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "the", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "can", "that", "this", "these", "those", "you",
    "he", "she", "it", "we", "they", "me", "him", "her", "us", "them", "my", "your", "his",
    "its", "our", "their",
];

/// Shared normalizer turning free text into a deduplicated token set.
///
/// Deterministic and pure: the same input always yields the same set, and
/// normalizing already-normalized text is a no-op.
#[derive(Debug, Clone)]
pub struct Tokenizer {
    stop_words: BTreeSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().map(ToString::to_string).collect(),
        }
    }
}

impl Tokenizer {
    /// Builds a tokenizer with the fixed stop-word list plus caller
    /// extensions (extensions are themselves lowercased).
    #[must_use]
    pub fn with_extra_stop_words<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tokenizer = Self::default();
        tokenizer
            .stop_words
            .extend(extra.into_iter().map(|w| w.as_ref().to_lowercase()));
        tokenizer
    }

    /// Normalizes `text` into its token set.
    ///
    /// Empty input, or input consisting only of punctuation, stop words, and
    /// single characters, yields an empty set.
    #[must_use]
    pub fn normalize(&self, text: &str) -> BTreeSet<String> {
        let folded: String = text.nfc().collect::<String>().to_lowercase();
        folded
            .split(|c: char| !c.is_alphanumeric())
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .filter(|token| !self.stop_words.contains(*token))
            .map(ToString::to_string)
            .collect()
    }

    /// Number of tokens shared between two normalized sets.
    #[must_use]
    pub fn overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> usize {
        if a.len() <= b.len() {
            a.iter().filter(|token| b.contains(*token)).count()
        } else {
            b.iter().filter(|token| a.contains(*token)).count()
        }
    }
}
