//! Runtime error types.

use thiserror::Error;

use admin_core::{LifecycleError, RegistryError};

use crate::config::ConfigError;

/// Errors that can occur while bootstrapping an [`AdminInterface`](crate::AdminInterface).
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Locating or loading the configuration failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A lifecycle handler failed.
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),

    /// A registry lookup failed, typically `App/instance` after start.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;
