//! Configuration module for the Admin Interface runtime.
//!
//! This module provides YAML-based configuration loading, the pass-through
//! configuration schema, and rc-file discovery of the default configuration.

pub mod error;
pub mod loader;
pub mod rc;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{ConfigLoader, Profile};
pub use rc::{ConfigSource, DotfileDiscovery, RC_FILE_NAME, RcDiscovery};
pub use schema::{AdminConfig, LogFormat, LogLevel, LogOutput, LogRotation, LoggingConfig};
