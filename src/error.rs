//! Error types.
//!
//! Configuration problems are fatal to the configuration being loaded, never
//! to a single arrangement request. Per-request outcomes such as an empty
//! scope or an indeterminate insertion are plain values, not errors.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to build a `RuleSet` from settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("alias `{name}` is not defined")]
    UndefinedAlias { name: String },

    #[error("alias cycle: {}", chain.join(" -> "))]
    AliasCycle { chain: Vec<String> },

    #[error("alias `{name}` is defined more than once")]
    DuplicateAlias { name: String },

    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid `{field}` condition value `{value}`: {message}")]
    InvalidCondition {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("failed to read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid {format} settings: {message}")]
    Parse {
        format: &'static str,
        message: String,
    },

    #[error("failed to write {format} settings: {message}")]
    Serialize {
        format: &'static str,
        message: String,
    },
}

/// Failure to load a syntax tree document.
#[derive(Debug, Error)]
pub enum TreeError {
    #[error("failed to read tree {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("tree {} is not valid JSON: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
