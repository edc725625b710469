//! Admin Runtime - Bootstrap orchestration for the Admin Interface framework.
//!
//! This crate provides:
//! - The lifecycle orchestrator ([`AdminInterface`])
//! - YAML configuration loading and `.admininterfacerc` discovery
//! - The built-in installation subscriber storing configuration in the registry
//! - Logging configuration
//!
//! ```ignore
//! use admin_runtime::AdminInterface;
//!
//! let mut admin = AdminInterface::new();
//! admin.register_plugin(&MyPlugin);
//! // No set_config_file: the configuration is located via .admininterfacerc
//! let app = admin.middleware::<axum::Router>()?;
//! ```

pub mod config;
pub mod error;
pub mod installation;
pub mod interface;
pub mod logging;
pub mod plugin;

// Re-exports
pub use config::{
    AdminConfig, ConfigError, ConfigLoader, ConfigResult, ConfigSource, DotfileDiscovery,
    RcDiscovery,
};
pub use error::{RuntimeError, RuntimeResult};
pub use interface::AdminInterface;
pub use logging::LoggingBuilder;
pub use plugin::AdminPlugin;

// Re-export tracing for use by plugins
pub use tracing;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use tracing::{Level, debug, error, info, instrument, span, trace, warn};
}
