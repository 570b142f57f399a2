//! Lazy search for every occurrence of one or more phrases in text runs.

use crate::location::{find_from, should_skip, to_location, Comparison, Location};
use crate::node::TextRun;

/// Settings shared by all scans of a rule.
#[derive(Clone, Copy, Default)]
pub struct ScanOptions {
    pub comparison: Comparison,
    pub trim_start: usize,
    pub trim_end: usize,
    /// Accepts a match only if the character following it passes. A match
    /// at the very end of a run has no following character and is kept.
    pub next_char: Option<fn(char) -> bool>,
}

impl ScanOptions {
    pub fn new(comparison: Comparison) -> Self {
        Self {
            comparison,
            ..Self::default()
        }
    }

    pub fn trimmed(mut self, trim_start: usize, trim_end: usize) -> Self {
        self.trim_start = trim_start;
        self.trim_end = trim_end;
        self
    }

    pub fn next_char(mut self, validator: fn(char) -> bool) -> Self {
        self.next_char = Some(validator);
        self
    }
}

/// Validator that rejects matches which are only the prefix of a longer
/// word.
pub fn is_word_end(c: char) -> bool {
    !c.is_alphanumeric() && c != '_'
}

/// Iterator over the locations of every pattern in one run.
///
/// Patterns are searched one after another; occurrences of the same
/// pattern never overlap. Different patterns may report overlapping spans,
/// see [`crate::overlap::resolve`].
pub struct Occurrences<'a, P> {
    run: &'a TextRun,
    patterns: &'a [P],
    options: ScanOptions,
    pattern_idx: usize,
    cursor: usize,
}

impl<'a, P: AsRef<str>> Occurrences<'a, P> {
    fn new(run: &'a TextRun, patterns: &'a [P], options: ScanOptions) -> Self {
        let shortest = patterns
            .iter()
            .map(|p| p.as_ref().len())
            .filter(|len| *len > 0)
            .min();
        let exhausted = match shortest {
            Some(len) => should_skip(run.text()) || run.text().len() < len,
            None => true,
        };
        Self {
            run,
            patterns,
            options,
            pattern_idx: if exhausted { patterns.len() } else { 0 },
            cursor: 0,
        }
    }
}

impl<P: AsRef<str>> Iterator for Occurrences<'_, P> {
    type Item = Location;

    fn next(&mut self) -> Option<Location> {
        let text = self.run.text();
        while let Some(pattern) = self.patterns.get(self.pattern_idx) {
            let pattern = pattern.as_ref();
            let found = if pattern.is_empty() {
                None
            } else {
                find_from(text, pattern, self.cursor, self.options.comparison)
            };
            let Some(position) = found else {
                self.pattern_idx += 1;
                self.cursor = 0;
                continue;
            };
            let end = position + pattern.len();
            self.cursor = end;
            if let Some(validator) = self.options.next_char {
                if let Some(next) = text[end..].chars().next() {
                    if !validator(next) {
                        // retry one character further on
                        let step = text[position..].chars().next().map_or(1, char::len_utf8);
                        self.cursor = position + step;
                        continue;
                    }
                }
            }
            return Some(to_location(
                self.run,
                position,
                pattern.len(),
                self.options.trim_start,
                self.options.trim_end,
            ));
        }
        None
    }
}

/// Every occurrence of every pattern in `run`.
pub fn scan_all<'a, P: AsRef<str>>(
    run: &'a TextRun,
    patterns: &'a [P],
    options: ScanOptions,
) -> Occurrences<'a, P> {
    Occurrences::new(run, patterns, options)
}

/// Every occurrence of every pattern across `runs`, in run order.
pub fn scan_runs<'a, I, P>(
    runs: I,
    patterns: &'a [P],
    options: ScanOptions,
) -> impl Iterator<Item = Location> + 'a
where
    I: IntoIterator<Item = &'a TextRun>,
    I::IntoIter: 'a,
    P: AsRef<str>,
{
    runs.into_iter()
        .flat_map(move |run| Occurrences::new(run, patterns, options))
}

/// True when any pattern occurs in `run`.
pub fn contains_any<P: AsRef<str>>(run: &TextRun, patterns: &[P], comparison: Comparison) -> bool {
    scan_all(run, patterns, ScanOptions::new(comparison))
        .next()
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRef;

    fn run(text: &str, at: usize) -> TextRun {
        TextRun::new(text, at, NodeRef(3))
    }

    #[test]
    fn yields_every_occurrence_of_each_pattern() {
        let r = run("null or null, never Null", 0);
        let found: Vec<_> = scan_all(&r, &["null"], ScanOptions::default())
            .map(|l| l.start)
            .collect();
        assert_eq!(found, vec![0, 8]);

        let found: Vec<_> = scan_all(&r, &["null"], ScanOptions::new(Comparison::IgnoreAsciiCase))
            .map(|l| l.start)
            .collect();
        assert_eq!(found, vec![0, 8, 20]);
    }

    #[test]
    fn validator_skips_word_prefixes() {
        let r = run("return returns return.", 10);
        let options = ScanOptions::default().next_char(is_word_end);
        let found: Vec<_> = scan_all(&r, &["return"], options).map(|l| l.start).collect();
        assert_eq!(found, vec![10, 25]);
    }

    #[test]
    fn short_runs_are_rejected_up_front() {
        let r = run("ab", 0);
        assert_eq!(scan_all(&r, &["abc"], ScanOptions::default()).count(), 0);
        let empty: [&str; 0] = [];
        assert_eq!(scan_all(&r, &empty, ScanOptions::default()).count(), 0);
    }

    #[test]
    fn scan_is_restartable() {
        let r = run("a b a b", 0);
        let patterns = ["a", "b"];
        let first: Vec<_> = scan_all(&r, &patterns, ScanOptions::default()).collect();
        let second: Vec<_> = scan_all(&r, &patterns, ScanOptions::default()).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn spans_stay_inside_their_run() {
        let runs = [run("is true when", 0), run("or true here", 40)];
        let options = ScanOptions::default().trimmed(1, 1);
        for loc in scan_runs(runs.iter(), &[" true "], options) {
            assert!(loc.start <= loc.end);
            let owner = runs
                .iter()
                .find(|r| loc.start >= r.absolute_start() && loc.end <= r.absolute_end());
            assert!(owner.is_some(), "{loc:?} escapes its run");
        }
        assert_eq!(scan_runs(runs.iter(), &[" true "], options).count(), 2);
    }

    #[test]
    fn contains_any_checks_all_patterns() {
        let r = run("Gets a value", 0);
        assert!(contains_any(&r, &["nope", "value"], Comparison::Ordinal));
        assert!(!contains_any(&r, &["VALUE"], Comparison::Ordinal));
    }
}
