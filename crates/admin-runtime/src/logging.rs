//! Logging utilities for the Admin Interface runtime.
//!
//! Logging is set up with `tracing` and `tracing-subscriber`. The orchestrator
//! calls [`init_from_config`] once the configuration file has been loaded, so
//! the `logging` section of `admin.yaml` controls the rest of the bootstrap.
//!
//! # Manual Initialization
//!
//! ```rust,ignore
//! use admin_runtime::logging::LoggingBuilder;
//!
//! LoggingBuilder::new()
//!     .directive("admin_core=debug")
//!     .init();
//! ```

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::{Subscriber, warn};
use tracing_appender::rolling::{self, RollingFileAppender};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::config::{LogFormat, LogOutput, LogRotation, LoggingConfig};

const DEFAULT_LOG_FILE: &str = "admin.log";

/// Initialize logging from a `LoggingConfig`.
///
/// A subscriber installed earlier (by the host or a previous run) is kept.
pub fn init_from_config(config: &LoggingConfig) {
    let _ = LoggingBuilder::from_config(config).try_init();
}

/// A builder for configuring logging.
#[derive(Default)]
pub struct LoggingBuilder {
    directives: Vec<String>,
    level: Option<tracing::Level>,
    format: LogFormat,
    output: LogOutput,
    with_target: bool,
    with_thread_ids: bool,
    with_file: bool,
    with_line_number: bool,
    file_path: Option<PathBuf>,
    rotation: LogRotation,
}

impl LoggingBuilder {
    /// Create a new logging builder.
    pub fn new() -> Self {
        Self {
            format: LogFormat::Compact,
            output: LogOutput::Stdout,
            with_target: true,
            ..Default::default()
        }
    }

    /// Create a LoggingBuilder from a LoggingConfig.
    pub fn from_config(config: &LoggingConfig) -> Self {
        let mut builder = Self::new();

        builder.level = Some(config.level.to_tracing_level());
        builder.format = config.format;
        builder.output = config.output;

        builder.with_thread_ids = config.thread_ids;
        builder.with_file = config.file_location;
        builder.with_line_number = config.file_location;

        builder.file_path.clone_from(&config.file_path);
        builder.rotation = config.rotation;

        for (module, level) in &config.filters {
            builder
                .directives
                .push(format!("{}={}", module, level.as_str()));
        }

        builder
    }

    /// Set the global log level.
    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.level = Some(level);
        self
    }

    /// Add a filter directive such as `admin_runtime=trace`.
    pub fn directive(mut self, directive: &str) -> Self {
        self.directives.push(directive.to_string());
        self
    }

    /// Set the output format.
    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Set the output destination.
    pub fn output(mut self, output: LogOutput) -> Self {
        self.output = output;
        self
    }

    /// Include the target (module path) in log output.
    pub fn with_target(mut self, enabled: bool) -> Self {
        self.with_target = enabled;
        self
    }

    /// Include thread IDs in log output.
    pub fn with_thread_ids(mut self, enabled: bool) -> Self {
        self.with_thread_ids = enabled;
        self
    }

    /// Include file names and line numbers in log output.
    pub fn with_file_location(mut self, enabled: bool) -> Self {
        self.with_file = enabled;
        self.with_line_number = enabled;
        self
    }

    /// Set file path for file output.
    pub fn file_path(mut self, path: PathBuf) -> Self {
        self.file_path = Some(path);
        self
    }

    /// Set the rotation policy for file output.
    pub fn rotation(mut self, rotation: LogRotation) -> Self {
        self.rotation = rotation;
        self
    }

    /// `RUST_LOG` wins over the configured level; directives are added on top.
    fn build_filter(&self) -> EnvFilter {
        let base_level = self.level.unwrap_or(tracing::Level::INFO);
        let base_filter = base_level.to_string().to_lowercase();

        let mut filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&base_filter));

        for directive in &self.directives {
            match directive.parse() {
                Ok(d) => filter = filter.add_directive(d),
                Err(e) => warn!(directive = %directive, error = %e, "Ignoring invalid log filter"),
            }
        }

        filter
    }

    /// Initialize the logging system.
    pub fn init(self) {
        let _ = self.try_init();
    }

    /// Try to initialize the logging system, returning an error on failure.
    pub fn try_init(self) -> Result<(), TryInitError> {
        let filter = self.build_filter();
        let layer = self.fmt_layer(self.make_writer());
        tracing_subscriber::registry()
            .with(layer)
            .with(filter)
            .try_init()
    }

    fn make_writer(&self) -> BoxMakeWriter {
        match (self.output, &self.file_path) {
            (LogOutput::Stdout, _) => BoxMakeWriter::new(std::io::stdout),
            (LogOutput::Stderr, _) => BoxMakeWriter::new(std::io::stderr),
            (LogOutput::File, Some(path)) => BoxMakeWriter::new(file_appender(path, self.rotation)),
            (LogOutput::File, None) => {
                warn!("File output requested but no file path configured, falling back to stdout");
                BoxMakeWriter::new(std::io::stdout)
            }
        }
    }

    /// `json` needs the `json-log` feature and falls back to `full` without it.
    fn fmt_layer<S>(&self, writer: BoxMakeWriter) -> Box<dyn Layer<S> + Send + Sync>
    where
        S: Subscriber + for<'a> LookupSpan<'a>,
    {
        let layer = fmt::layer()
            .with_writer(writer)
            .with_target(self.with_target)
            .with_thread_ids(self.with_thread_ids)
            .with_file(self.with_file)
            .with_line_number(self.with_line_number);

        match self.format {
            LogFormat::Compact => layer.compact().boxed(),
            LogFormat::Pretty => layer.pretty().boxed(),
            #[cfg(feature = "json-log")]
            LogFormat::Json => layer.json().boxed(),
            _ => layer.boxed(),
        }
    }
}

fn file_appender(path: &Path, rotation: LogRotation) -> RollingFileAppender {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_name()
        .unwrap_or_else(|| OsStr::new(DEFAULT_LOG_FILE));
    match rotation {
        LogRotation::Never => rolling::never(dir, name),
        LogRotation::Hourly => rolling::hourly(dir, name),
        LogRotation::Daily => rolling::daily(dir, name),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_builder_from_config() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            format: LogFormat::Pretty,
            output: LogOutput::File,
            file_path: Some(PathBuf::from("logs/admin.log")),
            rotation: LogRotation::Daily,
            filters: HashMap::from([("admin_core".to_string(), LogLevel::Trace)]),
            thread_ids: true,
            file_location: true,
        };

        let builder = LoggingBuilder::from_config(&config);

        assert_eq!(builder.level, Some(tracing::Level::DEBUG));
        assert_eq!(builder.format, LogFormat::Pretty);
        assert_eq!(builder.output, LogOutput::File);
        assert_eq!(builder.rotation, LogRotation::Daily);
        assert_eq!(builder.directives, vec!["admin_core=trace".to_string()]);
        assert!(builder.with_thread_ids);
        assert!(builder.with_file && builder.with_line_number);
    }

    #[test]
    fn test_file_appender_writes_into_parent_directory() {
        use std::io::Write;

        let dir = tempfile::tempdir().unwrap();
        let mut appender = file_appender(&dir.path().join("admin.log"), LogRotation::Never);
        appender.write_all(b"hello\n").unwrap();
        appender.flush().unwrap();

        assert!(dir.path().join("admin.log").is_file());
    }

    #[test]
    fn test_file_output_receives_events_in_every_format() {
        let dir = tempfile::tempdir().unwrap();
        for (format, name) in [
            (LogFormat::Compact, "compact.log"),
            (LogFormat::Full, "full.log"),
            (LogFormat::Pretty, "pretty.log"),
        ] {
            let path = dir.path().join(name);
            let builder = LoggingBuilder::new()
                .format(format)
                .output(LogOutput::File)
                .file_path(path.clone());
            let subscriber =
                tracing_subscriber::registry().with(builder.fmt_layer(builder.make_writer()));

            tracing::subscriber::with_default(subscriber, || {
                tracing::info!(format = ?format, "field types registered");
            });

            let written = std::fs::read_to_string(&path).unwrap();
            assert!(written.contains("field types registered"), "{name}: {written}");
        }
    }
}
