use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading configuration or building user tables.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("unsupported config format `{0}` (expected yml, yaml or json)")]
    UnsupportedFormat(String),

    #[error("phrase with replacement `{replacement}` has an empty pattern")]
    EmptyPattern { replacement: String },

    #[error("unknown built-in phrase catalog `{0}`")]
    UnknownCatalog(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
