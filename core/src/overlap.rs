//! Longest-span-wins de-duplication of overlapping matches.

use crate::engine::MatchCandidate;
use crate::location::Location;

/// Anything that covers a half-open byte range.
pub trait Spanned {
    fn span(&self) -> (usize, usize);
}

impl Spanned for Location {
    fn span(&self) -> (usize, usize) {
        (self.start, self.end)
    }
}

impl Spanned for MatchCandidate {
    fn span(&self) -> (usize, usize) {
        self.location.span()
    }
}

fn intersects(a: (usize, usize), b: (usize, usize)) -> bool {
    a.0 < b.1 && b.0 < a.1
}

/// Keeps the longest candidates and drops every candidate that intersects
/// one already kept. Equal lengths keep input order. The result is sorted
/// by start offset.
pub fn resolve<T: Spanned>(candidates: Vec<T>) -> Vec<T> {
    let mut sorted = candidates;
    sorted.sort_by(|a, b| {
        let (a_start, a_end) = a.span();
        let (b_start, b_end) = b.span();
        (b_end - b_start).cmp(&(a_end - a_start))
    });

    let mut accepted: Vec<T> = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        let span = candidate.span();
        if accepted.iter().all(|kept| !intersects(kept.span(), span)) {
            accepted.push(candidate);
        }
    }
    accepted.sort_by_key(|c| c.span());
    accepted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeRef;

    fn loc(start: usize, end: usize) -> Location {
        Location {
            start,
            end,
            source: NodeRef(0),
        }
    }

    #[test]
    fn prefers_longer_overlapping_match() {
        // "will never be" vs "will be" style overlap
        let kept = resolve(vec![loc(5, 12), loc(5, 18), loc(20, 25)]);
        assert_eq!(kept, vec![loc(5, 18), loc(20, 25)]);
    }

    #[test]
    fn touching_spans_do_not_overlap() {
        let kept = resolve(vec![loc(0, 4), loc(4, 8)]);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn ties_keep_first_seen() {
        let kept = resolve(vec![loc(2, 6), loc(4, 8)]);
        assert_eq!(kept, vec![loc(2, 6)]);
    }

    #[test]
    fn output_is_pairwise_disjoint_and_maximal() {
        let input = vec![
            loc(0, 3),
            loc(1, 9),
            loc(2, 4),
            loc(8, 12),
            loc(10, 11),
            loc(13, 20),
            loc(15, 16),
            loc(19, 30),
        ];
        let kept = resolve(input.clone());
        for (i, a) in kept.iter().enumerate() {
            for b in &kept[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
        for dropped in input.iter().filter(|c| !kept.contains(c)) {
            assert!(
                kept.iter().any(|k| k.intersects(dropped) && k.len() >= dropped.len()),
                "{dropped:?} dropped without a longer overlapping span"
            );
        }
    }
}
