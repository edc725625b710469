//! Unified error types for the Admin Interface core.
//!
//! Orchestrator-level errors (configuration, rc-file discovery) are defined in
//! admin-runtime.

use std::path::PathBuf;

use thiserror::Error;

use crate::lifecycle::Phase;

/// Boxed error returned by lifecycle handlers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

// =============================================================================
// Registry Errors
// =============================================================================

/// Errors raised by [`Registry`](crate::registry::Registry) lookups.
#[derive(Debug, Clone, Error)]
pub enum RegistryError {
    /// The repository was never created.
    #[error("repository '{0}' not found")]
    RepositoryNotFound(String),

    /// The repository exists but nothing was stored under the key.
    #[error("key '{key}' not found in repository '{repository}'")]
    KeyNotFound {
        /// Repository name.
        repository: String,
        /// Missing key.
        key: String,
    },

    /// A value is stored under the key, but of another type.
    #[error("value at '{repository}/{key}' is not a {expected}")]
    TypeMismatch {
        /// Repository name.
        repository: String,
        /// Key holding the value.
        key: String,
        /// Requested type name.
        expected: &'static str,
    },
}

// =============================================================================
// Lifecycle Errors
// =============================================================================

/// Errors raised while publishing a lifecycle phase.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// A subscribed handler failed; the remaining handlers of the phase were skipped.
    #[error("handler #{index} for phase '{phase}' failed: {source}")]
    Handler {
        /// Phase being published.
        phase: Phase,
        /// Position of the failing handler in subscription order.
        index: usize,
        /// Error returned by the handler.
        #[source]
        source: BoxError,
    },
}

// =============================================================================
// Field Errors
// =============================================================================

/// Errors raised by field-type plugins and their routing files.
#[derive(Debug, Error)]
pub enum FieldError {
    /// An untyped field definition carried a value of the wrong JSON type.
    #[error("field attribute '{attribute}' expects a {expected} value")]
    InvalidType {
        /// Attribute name as written in the definition.
        attribute: &'static str,
        /// Expected JSON type.
        expected: &'static str,
    },

    /// No field type was registered under the key.
    #[error("field type '{0}' is not registered")]
    UnknownFieldType(String),

    /// A `routing.yaml` file exists but could not be decoded.
    #[error("failed to parse routing file {path}: {reason}")]
    RoutingParse {
        /// Path of the routing file.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },

    /// Rendering failed inside a concrete field type.
    #[error("render failed: {0}")]
    Render(String),
}

impl FieldError {
    /// Creates a render error with the given message.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for registry lookups.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for lifecycle publishing.
pub type LifecycleResult<T> = Result<T, LifecycleError>;

/// Result type for field-type operations.
pub type FieldResult<T> = Result<T, FieldError>;
