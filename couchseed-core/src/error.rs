//! Error types for couchseed-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors from loading or saving `~/.couchseed/config.yaml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML serialization error (save path).
    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Malformed config file on load.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// `dirs::home_dir()` returned `None`.
    #[error("cannot determine home directory; set $HOME or equivalent")]
    HomeNotFound,
}

/// Errors from loading or validating a desired design document set.
#[derive(Debug, Error)]
pub enum DesiredError {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse design documents at {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to parse design documents at {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("design document id '{id}' does not start with '_design/'")]
    MissingPrefix { id: String },

    #[error("design document id '{id}' has an empty name")]
    EmptyName { id: String },

    #[error("duplicate design document id '{id}'")]
    DuplicateId { id: String },
}
