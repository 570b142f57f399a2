//! Heuristic detection of commented-out source code in comment lines.
//!
//! [`CodeDetector::classify`] runs a fixed sequence of syntactic checks.
//! A bare `Name = value;` line only counts as code when `Name` is a type
//! known to the compilation, which is what [`KnownNames`] tracks.

use std::sync::Arc;

use dashmap::DashSet;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Names starting with this are compiler generated and never recorded.
pub const RESERVED_MARKER: char = '<';

/// A referenced unit whose names could not be read.
#[derive(Debug, Error)]
pub enum ReferenceError {
    #[error("reference `{name}` could not be loaded: {reason}")]
    Unavailable { name: String, reason: String },
    #[error("reference `{name}` has no readable metadata")]
    NoMetadata { name: String },
}

/// Names contributed by a unit the compilation references.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferencedUnit {
    pub name: String,
    pub type_names: Vec<String>,
}

/// What the host knows about one compilation.
pub trait CompilationUnit {
    /// Identity used to refresh each compilation only once.
    fn id(&self) -> &str;

    fn assembly_name(&self) -> &str;

    /// Fully qualified or simple names of the types declared in the unit.
    fn type_names(&self) -> Vec<String>;

    /// Units this one references. Entries that fail to load are reported
    /// individually so the rest can still be used.
    fn referenced_units(&self) -> Vec<Result<ReferencedUnit, ReferenceError>>;
}

/// In-memory [`CompilationUnit`].
#[derive(Debug, Clone, Default)]
pub struct StaticUnit {
    pub id: String,
    pub assembly_name: String,
    pub type_names: Vec<String>,
    pub references: Vec<ReferencedUnit>,
    /// Names of references that fail to enumerate.
    pub broken_references: Vec<String>,
}

impl StaticUnit {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            assembly_name: id.clone(),
            id,
            ..Self::default()
        }
    }

    pub fn with_types<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names.extend(names.into_iter().map(Into::into));
        self
    }

    pub fn with_reference(mut self, reference: ReferencedUnit) -> Self {
        self.references.push(reference);
        self
    }

    pub fn with_broken_reference(mut self, name: impl Into<String>) -> Self {
        self.broken_references.push(name.into());
        self
    }
}

impl CompilationUnit for StaticUnit {
    fn id(&self) -> &str {
        &self.id
    }

    fn assembly_name(&self) -> &str {
        &self.assembly_name
    }

    fn type_names(&self) -> Vec<String> {
        self.type_names.clone()
    }

    fn referenced_units(&self) -> Vec<Result<ReferencedUnit, ReferenceError>> {
        let loaded = self.references.iter().cloned().map(Ok);
        let broken = self.broken_references.iter().map(|name| {
            Err(ReferenceError::Unavailable {
                name: name.clone(),
                reason: "metadata file not found".into(),
            })
        });
        loaded.chain(broken).collect()
    }
}

/// Append-only set of type and assembly names, shared between threads.
#[derive(Debug, Default)]
pub struct KnownNames {
    names: DashSet<String>,
    units: DashSet<String>,
}

impl KnownNames {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the names of `unit` and of the units it references. Returns
    /// how many names were new; a unit seen before adds nothing.
    pub fn refresh(&self, unit: &dyn CompilationUnit) -> usize {
        if self.units.contains(unit.id()) {
            return 0;
        }

        let mut added = self.insert(unit.assembly_name());
        for name in unit.type_names() {
            added += simple_type_name(&name).map_or(0, |name| self.insert(name));
        }
        for reference in unit.referenced_units() {
            match reference {
                Ok(reference) => {
                    added += self.insert(&reference.name);
                    for name in &reference.type_names {
                        added += simple_type_name(name).map_or(0, |name| self.insert(name));
                    }
                }
                Err(err) => {
                    tracing::warn!(unit = unit.id(), error = %err, "skipping unreadable reference");
                }
            }
        }
        self.units.insert(unit.id().to_string());
        tracing::debug!(unit = unit.id(), added, total = self.names.len(), "refreshed known names");
        added
    }

    fn insert(&self, name: &str) -> usize {
        if name.is_empty() || name.starts_with(RESERVED_MARKER) {
            return 0;
        }
        usize::from(self.names.insert(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn has_seen(&self, unit_id: &str) -> bool {
        self.units.contains(unit_id)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// `System.Collections.Generic.List`1` -> `List`. Generated names, which
/// carry the reserved marker in any segment, give `None`.
fn simple_type_name(name: &str) -> Option<&str> {
    if name.contains(RESERVED_MARKER) {
        return None;
    }
    let name = name.rsplit(['.', '+']).next().unwrap_or(name);
    name.split('`').next()
}

/// Tunables of the classifier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "kebab-case")]
pub struct DetectorPolicy {
    /// Comment markers of analyzer and formatter directives, which are not
    /// commented-out code.
    pub directive_markers: Vec<String>,
    /// Check banner lines (`===`, `---`, `***`) before `//` markers, so a
    /// `// ----` line counts as a banner instead of as a nested comment.
    pub frames_before_comments: bool,
}

impl Default for DetectorPolicy {
    fn default() -> Self {
        Self {
            directive_markers: vec![
                "ReSharper disable".into(),
                "ReSharper restore".into(),
                "#pragma warning".into(),
                "NOLINT".into(),
            ],
            frames_before_comments: false,
        }
    }
}

const DECLARATION_STARTS: &[&str] = &[
    "var ",
    "int ",
    "bool ",
    "public ",
    "private ",
    "internal ",
    "protected ",
];

const CONDITIONS: &[&str] = &[
    "??",
    "?.",
    "if(",
    "if (",
    "switch(",
    "switch (",
    "else if(",
    "else if (",
];

const FRAMES: &[&str] = &["===", "---", "***"];

const OPERATORS: &[&str] = &[
    "==", "!=", ">=", "<=", ">", "<", "++", "--", "+=", "-=", "*=", "/=", "=>", "&&", "||",
];

const LOCKS: &[&str] = &["lock (", "lock("];

static FIRST_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("static regex"));

/// Classifies comment lines as prose or disabled code.
#[derive(Debug, Clone)]
pub struct CodeDetector {
    names: Arc<KnownNames>,
    policy: DetectorPolicy,
}

impl CodeDetector {
    pub fn new(names: Arc<KnownNames>) -> Self {
        Self::with_policy(names, DetectorPolicy::default())
    }

    pub fn with_policy(names: Arc<KnownNames>, policy: DetectorPolicy) -> Self {
        Self { names, policy }
    }

    pub fn known_names(&self) -> &KnownNames {
        &self.names
    }

    /// Host hook, called once per analyzed compilation.
    pub fn observe_compilation(&self, unit: &dyn CompilationUnit) {
        self.names.refresh(unit);
    }

    /// True when `line` reads as source code rather than prose.
    pub fn classify(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        if line == "else" {
            return true;
        }
        if line.contains(['{', '}']) {
            return true;
        }
        if DECLARATION_STARTS.iter().any(|s| line.starts_with(s)) {
            return true;
        }
        if contains_any(line, CONDITIONS) {
            return true;
        }
        if self.policy.frames_before_comments && contains_any(line, FRAMES) {
            return false;
        }
        if line.contains("//") {
            return self.comment_marker_is_code(line);
        }
        if line.contains("$\"") {
            return true;
        }
        if line.contains(" = new") {
            return true;
        }
        if contains_any(line, FRAMES) {
            return false;
        }
        if (line.ends_with(';') || line.contains('=')) && self.is_statement(line) {
            return true;
        }
        if line.contains(':') && line.contains("case ") {
            return true;
        }
        contains_any(line, LOCKS)
    }

    fn comment_marker_is_code(&self, line: &str) -> bool {
        if line.contains("://") || line.ends_with("//") {
            return false;
        }
        !self
            .policy
            .directive_markers
            .iter()
            .any(|marker| line.contains(marker.as_str()))
    }

    fn is_statement(&self, line: &str) -> bool {
        if line.contains('.') {
            return true;
        }
        let call = line.contains('(') && line.contains(')');
        let index = line.contains('[') && line.contains(']');
        if call || index {
            return true;
        }
        if contains_any(line, OPERATORS) {
            return true;
        }
        FIRST_IDENTIFIER
            .find(line)
            .is_some_and(|word| self.names.contains(word.as_str()))
    }

    /// Zero-based indices and text of the lines of `text` that classify as
    /// code.
    pub fn code_lines<'t>(&self, text: &'t str) -> Vec<(usize, &'t str)> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| self.classify(line))
            .collect()
    }

    /// True when `text` has content and every non-blank line is code.
    pub fn is_commented_out(&self, text: &str) -> bool {
        let mut lines = text.lines().filter(|l| !l.trim().is_empty()).peekable();
        lines.peek().is_some() && lines.all(|l| self.classify(l))
    }
}

fn contains_any(line: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| line.contains(n))
}
