//! Combinatorial phrase generation and the built-in phrase catalogs.
//!
//! Catalogs are cross products of small word lists, expanded with article,
//! casing and misspelling variants. They are built once on first use and
//! never change afterwards.

use std::sync::Arc;

use once_cell::sync::Lazy;

use crate::casing::{lower_case_first, third_person_singular, upper_case_first, FirstWordPolicy};
use crate::location::Comparison;
use crate::phrase::{PhraseEntry, PhraseTable};

/// Phrase table together with the policy its rewrites use.
#[derive(Debug)]
pub struct PhraseRule {
    pub name: String,
    pub table: PhraseTable,
    pub policy: FirstWordPolicy,
}

/// Every `start + middle + end` concatenation, each mapped through
/// `replacement`.
pub fn cross<F>(
    starts: &[&str],
    middles: &[&str],
    ends: &[&str],
    replacement: F,
) -> Vec<PhraseEntry>
where
    F: Fn(&str, &str, &str) -> String,
{
    let mut out = Vec::with_capacity(starts.len() * middles.len() * ends.len());
    for start in starts {
        for middle in middles {
            for end in ends {
                out.push(PhraseEntry::new(
                    format!("{start}{middle}{end}"),
                    replacement(start, middle, end),
                ));
            }
        }
    }
    out
}

const ARTICLES: &[&str] = &["a ", "an ", "the "];

/// Adds copies of each entry with the leading article swapped for the
/// other articles.
pub fn with_articles(entries: Vec<PhraseEntry>) -> Vec<PhraseEntry> {
    let mut out = Vec::with_capacity(entries.len() * ARTICLES.len());
    for entry in entries {
        let lower = entry.pattern.to_ascii_lowercase();
        let article = ARTICLES.iter().find(|a| lower.starts_with(**a));
        if let Some(article) = article {
            let rest = &entry.pattern[article.len()..];
            let capital = entry.pattern.starts_with(|c: char| c.is_uppercase());
            for other in ARTICLES.iter().filter(|a| *a != article) {
                let pattern = if capital {
                    format!("{}{rest}", upper_case_first(other))
                } else {
                    format!("{other}{rest}")
                };
                out.push(PhraseEntry::new(pattern, entry.replacement.clone()));
            }
        }
        out.push(entry);
    }
    out
}

/// Frequent misspellings found in documentation comments.
const TYPOS: &[(&str, &[&str])] = &[
    ("whether", &["wether", "wheter", "whehter", "wheather"]),
    ("indicating", &["indicationg", "indicting", "inidcating"]),
    ("value", &["valeu", "vaule"]),
    ("never", &["nver"]),
    ("return", &["retrun"]),
];

/// Adds one copy of each entry per known misspelling of a word in its
/// pattern.
pub fn with_typos(entries: Vec<PhraseEntry>) -> Vec<PhraseEntry> {
    let mut out = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        for (word, typos) in TYPOS {
            if entry.pattern.contains(word) {
                for typo in typos.iter() {
                    out.push(PhraseEntry::new(
                        entry.pattern.replacen(word, typo, 1),
                        entry.replacement.clone(),
                    ));
                }
            }
        }
        out.push(entry);
    }
    out
}

/// Adds the variant whose pattern and replacement both start lower case
/// and the one where both start upper case.
pub fn with_first_letter_cases(entries: Vec<PhraseEntry>) -> Vec<PhraseEntry> {
    let mut out = Vec::with_capacity(entries.len() * 2);
    for entry in entries {
        out.push(PhraseEntry::new(
            upper_case_first(&entry.pattern),
            upper_case_first(&entry.replacement),
        ));
        out.push(PhraseEntry::new(
            lower_case_first(&entry.pattern),
            lower_case_first(&entry.replacement),
        ));
    }
    out
}

/// Drops entries whose pattern already is the accepted wording. Run this
/// after all variants are generated so variants of the accepted wording
/// survive.
pub fn without_identity(mut entries: Vec<PhraseEntry>) -> Vec<PhraseEntry> {
    entries.retain(|e| e.pattern != e.replacement);
    entries
}

static BOOLEAN_PROPERTY: Lazy<Arc<PhraseRule>> = Lazy::new(|| {
    let starts = ["Gets or sets ", "Sets or gets ", "Gets ", "Returns ", "Determines ", ""];
    let middles = [
        "a value indicating ",
        "a value that indicates ",
        "a flag indicating ",
        "a flag that indicates ",
        "a boolean indicating ",
        "a boolean value indicating ",
        "value indicating ",
        "flag indicating ",
        "a value which indicates ",
    ];
    let conditions = ["whether ", "if ", "whether or not "];
    let entries = cross(&starts, &middles, &conditions, |start, _, _| {
        if start.starts_with("Gets or") || start.starts_with("Sets or") {
            "Gets or sets a value indicating whether ".to_string()
        } else {
            "Gets a value indicating whether ".to_string()
        }
    });
    let entries = with_typos(with_articles(entries))
        .into_iter()
        .map(|e| PhraseEntry::new(upper_case_first(&e.pattern), e.replacement))
        .collect();
    Arc::new(PhraseRule {
        name: "boolean-property".into(),
        table: PhraseTable::build(without_identity(entries), Comparison::Ordinal),
        policy: FirstWordPolicy::LOWER,
    })
});

const FUTURE_VERBS: &[&str] = &[
    "be", "return", "throw", "get", "set", "have", "contain", "create", "call", "raise", "cause",
    "fail", "try", "use", "do", "match",
];

const ADVERBS: &[&str] = &["", "never ", "not ", "always ", "also ", "only "];

static FUTURE_TENSE: Lazy<Arc<PhraseRule>> = Lazy::new(|| {
    let entries = cross(&["will ", "shall ", "wil "], ADVERBS, FUTURE_VERBS, |_, adverb, verb| {
        let inflected = third_person_singular(verb);
        match (adverb, verb) {
            ("", _) => inflected,
            (adverb, "be") => format!("{inflected} {}", adverb.trim_end()),
            ("not ", verb) => format!("does not {verb}"),
            (adverb, _) => format!("{adverb}{inflected}"),
        }
    });
    Arc::new(PhraseRule {
        name: "future-tense".into(),
        table: PhraseTable::build(
            without_identity(with_typos(with_first_letter_cases(entries))),
            Comparison::Ordinal,
        ),
        policy: FirstWordPolicy::KEEP.keep_leading_space(),
    })
});

/// Rewrites boolean property summaries to "Gets a value indicating
/// whether ...".
pub fn boolean_property() -> Arc<PhraseRule> {
    Arc::clone(&BOOLEAN_PROPERTY)
}

/// Rewrites future tense ("will return") to present tense ("returns").
pub fn future_tense() -> Arc<PhraseRule> {
    Arc::clone(&FUTURE_TENSE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cross_builds_every_combination() {
        let entries = cross(&["a", "b"], &["-"], &["x", "y"], |s, _, e| format!("{e}{s}"));
        let patterns: Vec<_> = entries.iter().map(|e| e.pattern.as_str()).collect();
        assert_eq!(patterns, vec!["a-x", "a-y", "b-x", "b-y"]);
    }

    #[test]
    fn identity_entries_are_dropped_after_expansion() {
        let entries = cross(&["same"], &[""], &[""], |s, _, _| s.to_string());
        assert_eq!(entries.len(), 1);
        assert!(without_identity(entries).is_empty());
    }

    #[test]
    fn article_variants_follow_capitalisation() {
        let entries = with_articles(vec![PhraseEntry::new("A flag", "x")]);
        let patterns: Vec<_> = entries.iter().map(|e| e.pattern.as_str()).collect();
        assert!(patterns.contains(&"An flag"));
        assert!(patterns.contains(&"The flag"));
        assert!(patterns.contains(&"A flag"));
    }

    #[test]
    fn typo_variants_share_replacement() {
        let entries = with_typos(vec![PhraseEntry::new("indicating whether", "ok")]);
        assert!(entries.iter().any(|e| e.pattern == "indicating wether"));
        assert!(entries.iter().any(|e| e.pattern == "indicationg whether"));
        assert!(entries.iter().all(|e| e.replacement == "ok"));
    }

    #[test]
    fn boolean_catalog_normalises_variants() {
        let rule = boolean_property();
        let hit = rule
            .table
            .lookup_prefix("Returns a flag that indicates if the item is visible.")
            .unwrap();
        assert_eq!(hit.replacement, "Gets a value indicating whether ");
        let hit = rule
            .table
            .lookup_prefix("Gets or sets a value indicating wether the item is visible.")
            .unwrap();
        assert_eq!(hit.replacement, "Gets or sets a value indicating whether ");
        assert!(rule
            .table
            .lookup_prefix("Gets a value indicating whether the item is visible.")
            .is_none());
    }

    #[test]
    fn future_tense_catalog_inflects_verbs() {
        let rule = future_tense();
        let get = |text: &str| rule.table.lookup_prefix(text).map(|e| e.replacement.clone());
        assert_eq!(get("will return null").as_deref(), Some("returns"));
        assert_eq!(get("will never be null").as_deref(), Some("is never"));
        assert_eq!(get("will not throw").as_deref(), Some("does not throw"));
        assert_eq!(get("Will try again").as_deref(), Some("Tries"));
        assert_eq!(get("will always match").as_deref(), Some("always matches"));
    }
}
