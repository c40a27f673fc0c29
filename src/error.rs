//! Error types
//!
//! Catalog errors are startup-only: once a resolver exists, resolution never fails.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Catalog declares no intents")]
    Empty,

    #[error("Duplicate intent name: {0}")]
    DuplicateIntent(String),

    #[error("Intent {intent} has no patterns")]
    EmptyPattern { intent: String },

    #[error("Invalid pattern for {intent}: {pattern}")]
    InvalidPattern {
        intent: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Parameter {key} of {intent} is missing field `{field}`")]
    MissingField {
        intent: String,
        key: String,
        field: &'static str,
    },

    #[error("Fallback intent must not be blank: {0}")]
    UnknownFallbackIntent(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("No executor registered for intent {intent}")]
    NoExecutor { intent: String },

    #[error("Capability {capability} is unavailable for intent {intent}")]
    Unavailable { capability: String, intent: String },
}
