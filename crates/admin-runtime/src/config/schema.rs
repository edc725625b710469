//! Configuration schema definitions.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Root configuration structure.
///
/// Only `logging` and `locals` are read by the framework itself. Every other
/// top-level section (`models`, `database`, ...) is kept verbatim in `extra`
/// and passed through to `set-config` subscribers.
///
/// ```yaml
/// logging:
///   level: debug
/// locals:
///   siteName: Demo admin
/// models:
///   post:
///     title: Posts
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdminConfig {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Template locals joined into every field render context.
    #[serde(default)]
    pub locals: Map<String, Value>,

    /// All other sections, untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AdminConfig {
    /// Returns a pass-through section by name.
    pub fn section(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Converts the whole configuration to a plain JSON mapping.
    pub fn to_value(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }
}

// =============================================================================
// Logging
// =============================================================================

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Global log level.
    pub level: LogLevel,

    /// Output format.
    pub format: LogFormat,

    /// Output destination.
    pub output: LogOutput,

    /// Log file, required when `output` is `file`.
    pub file_path: Option<PathBuf>,

    /// File rotation policy.
    pub rotation: LogRotation,

    /// Per-module level overrides (`admin_runtime: trace`).
    pub filters: HashMap<String, LogLevel>,

    /// Include thread IDs.
    pub thread_ids: bool,

    /// Include file names and line numbers.
    pub file_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: LogLevel::Info,
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            file_path: None,
            rotation: LogRotation::Never,
            filters: HashMap::new(),
            thread_ids: false,
            file_location: false,
        }
    }
}

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }

    pub fn to_tracing_level(self) -> tracing::Level {
        match self {
            Self::Trace => tracing::Level::TRACE,
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warn => tracing::Level::WARN,
            Self::Error => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Full,
    Pretty,
    /// Requires the `json-log` feature; falls back to `full` otherwise.
    Json,
}

/// Log output destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Stdout,
    Stderr,
    File,
}

/// Rotation policy for file output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    #[default]
    Never,
    Hourly,
    Daily,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_unknown_sections_pass_through() {
        let config: AdminConfig = serde_json::from_value(json!({
            "logging": { "level": "debug" },
            "locals": { "siteName": "Demo" },
            "models": { "post": { "title": "Posts" } },
        }))
        .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.locals.get("siteName"), Some(&json!("Demo")));
        assert_eq!(config.section("models").unwrap()["post"]["title"], json!("Posts"));

        let value = config.to_value().unwrap();
        assert_eq!(value["models"]["post"]["title"], json!("Posts"));
        assert_eq!(value["locals"]["siteName"], json!("Demo"));
    }
}
