//! Error types for stagehand-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Underlying I/O failure (permission denied, etc.).
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load, with path and serde_yaml's line context.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The config file did not exist at the expected path.
    #[error("config not found at {path}")]
    NotFound { path: PathBuf },

    #[error("project_filename must not be empty")]
    MissingProjectFilename,

    /// `project_filename` prefixes every staged and installed file name, so
    /// it must be a single path component.
    #[error("project_filename '{value}' is invalid: {reason}")]
    InvalidProjectFilename { value: String, reason: String },

    /// Two services share a name; names key every derived path.
    #[error("service '{name}' is declared more than once")]
    DuplicateService { name: String },

    #[error("service '{name}' is invalid: {reason}")]
    InvalidService { name: String, reason: String },

    /// The requested target is not declared under `targets`.
    #[error("unknown target '{name}' (declared: {declared})")]
    UnknownTarget { name: String, declared: String },
}

pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> ConfigError {
    ConfigError::Io {
        path: path.into(),
        source,
    }
}
