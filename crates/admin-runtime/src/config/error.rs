//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while locating and loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// File not found at the specified path.
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    /// The configuration could not be parsed or extracted.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// An rc file was found but is unusable.
    #[error("Invalid rc file {path}: {reason}")]
    RcFile { path: PathBuf, reason: String },

    /// The configuration could not be converted to a plain mapping.
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl ConfigError {
    /// Creates an rc-file error.
    pub fn rc_file(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::RcFile {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
