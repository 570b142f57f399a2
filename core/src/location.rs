//! Mapping of in-run matches to absolute source locations.

use serde::{Deserialize, Serialize};

use crate::node::{NodeRef, TextRun};

/// Runs shorter than this that hold only whitespace are never scanned.
const MIN_SCAN_LEN: usize = 2;

/// String comparison used by every search in the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Comparison {
    #[default]
    Ordinal,
    IgnoreAsciiCase,
}

/// Which occurrence `locate` reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    First,
    Last,
}

/// Half-open byte range `[start, end)` in the host source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    pub start: usize,
    pub end: usize,
    pub source: NodeRef,
}

impl Location {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn intersects(&self, other: &Location) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Locates `pattern` in `run` and returns the underlined range, skipping
/// `trim_start` bytes at the front and `trim_end` bytes at the back of the
/// match.
pub fn locate(
    run: &TextRun,
    pattern: &str,
    comparison: Comparison,
    direction: Direction,
    trim_start: usize,
    trim_end: usize,
) -> Option<Location> {
    let text = run.text();
    if should_skip(text) || pattern.is_empty() {
        return None;
    }
    let position = match direction {
        Direction::First => find_from(text, pattern, 0, comparison),
        Direction::Last => rfind(text, pattern, comparison),
    }?;
    Some(to_location(run, position, pattern.len(), trim_start, trim_end))
}

pub(crate) fn should_skip(text: &str) -> bool {
    text.is_empty() || (text.len() < MIN_SCAN_LEN && text.trim().is_empty())
}

pub(crate) fn to_location(
    run: &TextRun,
    position: usize,
    len: usize,
    trim_start: usize,
    trim_end: usize,
) -> Location {
    let base = run.absolute_start() + position;
    let start = base + trim_start.min(len);
    let end = (base + len.saturating_sub(trim_end)).max(start);
    Location {
        start,
        end,
        source: run.owner(),
    }
}

/// Byte offset of the first occurrence of `needle` at or after `from`.
///
/// Case folding is ASCII only so byte offsets in the haystack and the
/// needle stay aligned, and every returned offset is a char boundary.
pub fn find_from(
    haystack: &str,
    needle: &str,
    from: usize,
    comparison: Comparison,
) -> Option<usize> {
    if needle.is_empty() || from > haystack.len() {
        return None;
    }
    match comparison {
        Comparison::Ordinal => haystack.get(from..)?.find(needle).map(|p| p + from),
        Comparison::IgnoreAsciiCase => {
            let hay = haystack.as_bytes();
            let pat = needle.as_bytes();
            if hay.len() < pat.len() {
                return None;
            }
            (from..=hay.len() - pat.len())
                .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
        }
    }
}

/// Byte offset of the last occurrence of `needle`.
pub fn rfind(haystack: &str, needle: &str, comparison: Comparison) -> Option<usize> {
    if needle.is_empty() {
        return None;
    }
    match comparison {
        Comparison::Ordinal => haystack.rfind(needle),
        Comparison::IgnoreAsciiCase => {
            let hay = haystack.as_bytes();
            let pat = needle.as_bytes();
            if hay.len() < pat.len() {
                return None;
            }
            (0..=hay.len() - pat.len())
                .rev()
                .find(|&i| hay[i..i + pat.len()].eq_ignore_ascii_case(pat))
        }
    }
}

/// True when `text` starts with `prefix` under `comparison`.
pub fn starts_with(text: &str, prefix: &str, comparison: Comparison) -> bool {
    match comparison {
        Comparison::Ordinal => text.starts_with(prefix),
        Comparison::IgnoreAsciiCase => text
            .as_bytes()
            .get(..prefix.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(prefix.as_bytes())),
    }
}
