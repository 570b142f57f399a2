//! First-word casing and verb inflection applied after a replacement.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// How the first word after a replacement is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Casing {
    #[default]
    Keep,
    Upper,
    Lower,
    /// `return` -> `returns`, `try` -> `tries`.
    ThirdPersonSingular,
}

/// Casing of the remainder plus whether its leading whitespace survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FirstWordPolicy {
    pub casing: Casing,
    pub keep_leading_space: bool,
}

impl FirstWordPolicy {
    pub const KEEP: Self = Self::new(Casing::Keep);
    pub const UPPER: Self = Self::new(Casing::Upper);
    pub const LOWER: Self = Self::new(Casing::Lower);
    pub const THIRD_PERSON: Self = Self::new(Casing::ThirdPersonSingular);

    pub const fn new(casing: Casing) -> Self {
        Self {
            casing,
            keep_leading_space: false,
        }
    }

    pub const fn keep_leading_space(self) -> Self {
        Self {
            keep_leading_space: true,
            ..self
        }
    }

    /// Rewrites the first word of `text`, leaving everything else intact.
    pub fn apply_to_first_word(&self, text: &str) -> String {
        if self.casing == Casing::Keep {
            return text.to_string();
        }
        let Some((start, word)) = first_word(text) else {
            return text.to_string();
        };
        let rewritten = match self.casing {
            Casing::Keep => return text.to_string(),
            Casing::Upper => upper_case_first(word),
            Casing::Lower => lower_case_first(word),
            Casing::ThirdPersonSingular => third_person_singular(word),
        };
        let mut out = String::with_capacity(text.len() + 2);
        out.push_str(&text[..start]);
        out.push_str(&rewritten);
        out.push_str(&text[start + word.len()..]);
        out
    }
}

/// Byte offset and text of the first word in `text`.
pub fn first_word(text: &str) -> Option<(usize, &str)> {
    text.split_word_bound_indices()
        .find(|(_, w)| w.chars().next().is_some_and(char::is_alphanumeric))
}

pub fn upper_case_first(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lower-cases the first letter. Acronyms and identifiers such as `XML` or
/// `IOStream` come back unchanged.
pub fn lower_case_first(word: &str) -> String {
    if word.chars().nth(1).is_some_and(char::is_uppercase) {
        return word.to_string();
    }
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

const IRREGULAR_VERBS: &[(&str, &str)] = &[
    ("be", "is"),
    ("are", "is"),
    ("have", "has"),
    ("do", "does"),
    ("go", "goes"),
    ("can", "can"),
    ("may", "may"),
    ("must", "must"),
    ("shall", "shall"),
    ("will", "will"),
];

/// Words that look like verbs in base form but are not.
const NOT_VERBS: &[&str] = &[
    "a", "an", "the", "this", "that", "its", "it", "if", "when", "whether",
];

/// Third person singular present form of `word`.
///
/// Returns `None` when the word cannot be inflected, e.g. it already is
/// inflected or it is not a verb.
pub fn try_third_person_singular(word: &str) -> Option<String> {
    if word.is_empty() || !word.chars().all(char::is_alphabetic) {
        return None;
    }
    let lower = word.to_lowercase();
    if NOT_VERBS.contains(&lower.as_str()) {
        return None;
    }
    if let Some((_, inflected)) = IRREGULAR_VERBS.iter().find(|(base, _)| *base == lower) {
        return Some(match_case(word, inflected));
    }
    if lower == "is" || lower == "has" || lower == "does" || lower == "goes" {
        return None;
    }
    if lower.ends_with("ss") {
        return Some(format!("{word}es"));
    }
    if lower.ends_with('s') {
        // already inflected ("returns") or a plural noun
        return None;
    }
    let bytes = lower.as_bytes();
    if lower.ends_with('y') && bytes.len() > 1 && !is_vowel(bytes[bytes.len() - 2]) {
        return Some(format!("{}ies", &word[..word.len() - 1]));
    }
    if ["sh", "ch", "x", "z", "o"].iter().any(|s| lower.ends_with(s)) {
        return Some(format!("{word}es"));
    }
    Some(format!("{word}s"))
}

/// Like [`try_third_person_singular`] but falls back to the word itself.
pub fn third_person_singular(word: &str) -> String {
    try_third_person_singular(word).unwrap_or_else(|| word.to_string())
}

fn is_vowel(b: u8) -> bool {
    matches!(b, b'a' | b'e' | b'i' | b'o' | b'u')
}

fn match_case(original: &str, replacement: &str) -> String {
    if original.chars().next().is_some_and(char::is_uppercase) {
        upper_case_first(replacement)
    } else {
        replacement.to_string()
    }
}
