//! Documentation comment phrase engine.
//! Finds wording in documentation comments that a phrase table rejects,
//! rewrites it into the accepted phrasing and tells prose apart from
//! commented-out code.

use std::{fs, path::Path, sync::Arc};

use serde::{Deserialize, Serialize};

pub mod casing;
pub mod detector;
pub mod engine;
mod error;
pub mod generate;
pub mod location;
pub mod node;
pub mod overlap;
pub mod phrase;
pub mod scanner;

pub use casing::{Casing, FirstWordPolicy};
pub use detector::{
    CodeDetector, CompilationUnit, DetectorPolicy, KnownNames, ReferenceError, ReferencedUnit,
    StaticUnit,
};
pub use engine::{
    apply, apply_rule, find_candidates, merge_adjacent_text, remove_elements, MatchCandidate,
};
pub use error::{Error, Result};
pub use generate::PhraseRule;
pub use location::{locate, Comparison, Direction, Location};
pub use node::{Attribute, DocComment, DocNode, Element, EmptyElement, NodeRef, TextNode, TextRun};
pub use overlap::{resolve, Spanned};
pub use phrase::{PhraseEntry, PhraseTable};
pub use scanner::{contains_any, scan_all, scan_runs, ScanOptions};

/// User defined phrase table.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "kebab-case")]
pub struct TableConfig {
    pub name: String,
    pub ignore_case: bool,
    pub first_word: FirstWordPolicy,
    pub entries: Vec<PhraseEntry>,
}

impl TableConfig {
    pub fn compile(&self) -> Result<PhraseRule> {
        let comparison = if self.ignore_case {
            Comparison::IgnoreAsciiCase
        } else {
            Comparison::Ordinal
        };
        Ok(PhraseRule {
            name: self.name.clone(),
            table: PhraseTable::try_build(self.entries.iter().cloned(), comparison)?,
            policy: self.first_word,
        })
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    pub detector: DetectorPolicy,
    /// Names of the built-in catalogs to enable.
    pub builtin_tables: Vec<String>,
    pub tables: Vec<TableConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            detector: DetectorPolicy::default(),
            builtin_tables: vec!["boolean-property".into(), "future-tense".into()],
            tables: Vec::new(),
        }
    }
}

impl Config {
    /// Reads a YAML (`.yml`, `.yaml`) or JSON (`.json`) config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let ext = path.extension().and_then(|s| s.to_str()).unwrap_or("");
        match ext.to_lowercase().as_str() {
            "yml" | "yaml" => {
                let value: serde_yaml::Value =
                    serde_yaml::from_str(&text).map_err(|source| Error::Yaml {
                        path: path.to_path_buf(),
                        source,
                    })?;
                serde_yaml::from_value(value).map_err(|source| Error::Yaml {
                    path: path.to_path_buf(),
                    source,
                })
            }
            "json" => serde_json::from_str(&text).map_err(|source| Error::Json {
                path: path.to_path_buf(),
                source,
            }),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    /// Built-in catalogs followed by the user tables.
    pub fn rules(&self) -> Result<Vec<Arc<PhraseRule>>> {
        let mut rules = Vec::with_capacity(self.builtin_tables.len() + self.tables.len());
        for name in &self.builtin_tables {
            let rule = builtin(name).ok_or_else(|| Error::UnknownCatalog(name.clone()))?;
            rules.push(rule);
        }
        for table in &self.tables {
            rules.push(Arc::new(table.compile()?));
        }
        Ok(rules)
    }

    pub fn detector(&self, names: Arc<KnownNames>) -> CodeDetector {
        CodeDetector::with_policy(names, self.detector.clone())
    }
}

fn builtin(name: &str) -> Option<Arc<PhraseRule>> {
    match name {
        "boolean-property" => Some(generate::boolean_property()),
        "future-tense" => Some(generate::future_tense()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_enables_builtin_catalogs() {
        let rules = Config::default().rules().unwrap();
        let names: Vec<_> = rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["boolean-property", "future-tense"]);
    }

    #[test]
    fn unknown_catalog_is_an_error() {
        let cfg = Config {
            builtin_tables: vec!["nope".into()],
            ..Config::default()
        };
        assert!(matches!(cfg.rules(), Err(Error::UnknownCatalog(name)) if name == "nope"));
    }

    #[test]
    fn user_tables_compile_with_their_policy() {
        let cfg: Config = serde_yaml::from_str(
            r#"
builtin-tables: []
tables:
  - name: nullability
    ignore-case: true
    first-word:
      casing: lower
    entries:
      - pattern: "may be null"
        replacement: "can be null"
"#,
        )
        .unwrap();
        let rules = cfg.rules().unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].policy, FirstWordPolicy::LOWER);
        assert_eq!(rules[0].table.comparison(), Comparison::IgnoreAsciiCase);
        assert!(rules[0].table.lookup_prefix("May Be Null here").is_some());
    }
}
