//! Ordered phrase tables with longest-match lookup.

use std::collections::{HashMap, HashSet};

use aho_corasick::{AhoCorasick, AhoCorasickBuilder};
use serde::{Deserialize, Serialize};

use crate::location::{find_from, starts_with, Comparison};
use crate::{Error, Result};

/// Pattern and the wording that replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhraseEntry {
    pub pattern: String,
    pub replacement: String,
}

impl PhraseEntry {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

impl<P: Into<String>, R: Into<String>> From<(P, R)> for PhraseEntry {
    fn from((pattern, replacement): (P, R)) -> Self {
        PhraseEntry::new(pattern, replacement)
    }
}

/// Immutable phrase table.
///
/// Entries are sorted by descending pattern length, then ascending
/// pattern, so the first hit of a linear scan is always the longest one.
/// Buckets keyed by the ASCII-lowercased first character hold indices into
/// the same ordering and only narrow the scan.
pub struct PhraseTable {
    entries: Vec<PhraseEntry>,
    buckets: HashMap<char, Vec<usize>>,
    comparison: Comparison,
    matcher: Option<AhoCorasick>,
    min_len: usize,
}

impl std::fmt::Debug for PhraseTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhraseTable")
            .field("entries", &self.entries.len())
            .field("comparison", &self.comparison)
            .field("min_len", &self.min_len)
            .finish()
    }
}

impl PhraseTable {
    /// Builds a table from trusted, usually generated, entries. Empty
    /// patterns are dropped; duplicates keep the first replacement seen.
    pub fn build<I, E>(entries: I, comparison: Comparison) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<PhraseEntry>,
    {
        let mut seen = HashSet::new();
        let mut unique = Vec::new();
        for entry in entries {
            let entry: PhraseEntry = entry.into();
            debug_assert!(!entry.pattern.is_empty(), "empty phrase pattern");
            if entry.pattern.is_empty() {
                continue;
            }
            if seen.insert(dedup_key(&entry.pattern, comparison)) {
                unique.push(entry);
            }
        }
        Self::from_unique(unique, comparison)
    }

    /// Builds a table from user supplied entries, rejecting empty patterns.
    pub fn try_build<I, E>(entries: I, comparison: Comparison) -> Result<Self>
    where
        I: IntoIterator<Item = E>,
        E: Into<PhraseEntry>,
    {
        let entries: Vec<PhraseEntry> = entries.into_iter().map(Into::into).collect();
        if let Some(entry) = entries.iter().find(|e| e.pattern.trim().is_empty()) {
            return Err(Error::EmptyPattern {
                replacement: entry.replacement.clone(),
            });
        }
        Ok(Self::build(entries, comparison))
    }

    fn from_unique(mut entries: Vec<PhraseEntry>, comparison: Comparison) -> Self {
        entries.sort_by(|a, b| {
            b.pattern
                .len()
                .cmp(&a.pattern.len())
                .then_with(|| a.pattern.cmp(&b.pattern))
        });

        let mut buckets: HashMap<char, Vec<usize>> = HashMap::new();
        for (idx, entry) in entries.iter().enumerate() {
            if let Some(key) = bucket_key(&entry.pattern) {
                buckets.entry(key).or_default().push(idx);
            }
        }

        let matcher = if entries.is_empty() {
            None
        } else {
            Some(
                AhoCorasickBuilder::new()
                    .ascii_case_insensitive(true)
                    .build(entries.iter().map(|e| e.pattern.as_str())),
            )
        };
        let min_len = entries.iter().map(|e| e.pattern.len()).min().unwrap_or(0);
        tracing::debug!(
            entries = entries.len(),
            buckets = buckets.len(),
            min_len,
            "built phrase table"
        );

        Self {
            entries,
            buckets,
            comparison,
            matcher,
            min_len,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn comparison(&self) -> Comparison {
        self.comparison
    }

    /// Length in bytes of the shortest pattern, 0 for an empty table.
    pub fn min_pattern_len(&self) -> usize {
        self.min_len
    }

    /// Entries in lookup order.
    pub fn iter(&self) -> std::slice::Iter<'_, PhraseEntry> {
        self.entries.iter()
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.pattern.as_str())
    }

    /// Cheap check whether any pattern could occur in `text`.
    pub fn may_match(&self, text: &str) -> bool {
        match &self.matcher {
            Some(matcher) => text.len() >= self.min_len && matcher.is_match(text),
            None => false,
        }
    }

    /// Longest pattern that is a prefix of `text`.
    pub fn lookup_prefix<'a>(&'a self, text: &'a str) -> Option<&'a PhraseEntry> {
        self.prefix_matches(text).next()
    }

    /// Longest pattern contained anywhere in `text`.
    pub fn lookup_contained(&self, text: &str) -> Option<&PhraseEntry> {
        if !self.may_match(text) {
            return None;
        }
        self.entries
            .iter()
            .find(|e| find_from(text, &e.pattern, 0, self.comparison).is_some())
    }

    /// Every pattern that is a prefix of `text`, longest first.
    pub fn prefix_matches<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = &'a PhraseEntry> + 'a {
        let bucket = if text.len() < self.min_len {
            None
        } else {
            bucket_key(text).and_then(|key| self.buckets.get(&key))
        };
        bucket
            .into_iter()
            .flatten()
            .map(|&idx| &self.entries[idx])
            .filter(move |e| starts_with(text, &e.pattern, self.comparison))
    }

    /// Longest pattern starting at byte `pos` of `text` that sits on word
    /// boundaries.
    pub fn longest_at<'a>(&'a self, text: &'a str, pos: usize) -> Option<&'a PhraseEntry> {
        let prev = text[..pos].chars().next_back();
        let rest = &text[pos..];
        self.prefix_matches(rest).find(|e| {
            let pattern = e.pattern.as_str();
            let starts_word = pattern.chars().next().is_some_and(is_word_char);
            let ends_word = pattern.chars().next_back().is_some_and(is_word_char);
            let next = rest[pattern.len()..].chars().next();
            !(starts_word && prev.is_some_and(is_word_char))
                && !(ends_word && next.is_some_and(is_word_char))
        })
    }

    /// Non-overlapping matches of `text`, scanning left to right and taking
    /// the longest entry at each position.
    pub fn find_iter<'a>(&'a self, text: &'a str) -> PhraseMatches<'a> {
        PhraseMatches {
            table: self,
            text,
            pos: if self.may_match(text) { 0 } else { text.len() },
        }
    }
}

/// One phrase occurrence, byte offsets local to the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseMatch<'a> {
    pub start: usize,
    pub end: usize,
    pub entry: &'a PhraseEntry,
}

pub struct PhraseMatches<'a> {
    table: &'a PhraseTable,
    text: &'a str,
    pos: usize,
}

impl<'a> Iterator for PhraseMatches<'a> {
    type Item = PhraseMatch<'a>;

    fn next(&mut self) -> Option<PhraseMatch<'a>> {
        while self.pos < self.text.len() {
            let start = self.pos;
            if let Some(entry) = self.table.longest_at(self.text, start) {
                self.pos = start + entry.pattern.len();
                return Some(PhraseMatch {
                    start,
                    end: self.pos,
                    entry,
                });
            }
            self.pos += self.text[start..].chars().next().map_or(1, char::len_utf8);
        }
        None
    }
}

pub(crate) fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn bucket_key(text: &str) -> Option<char> {
    text.chars().next().map(|c| c.to_ascii_lowercase())
}

fn dedup_key(pattern: &str, comparison: Comparison) -> String {
    match comparison {
        Comparison::Ordinal => pattern.to_string(),
        Comparison::IgnoreAsciiCase => pattern.to_ascii_lowercase(),
    }
}
