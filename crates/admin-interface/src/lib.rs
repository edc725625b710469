//! # Admin Interface
//!
//! A plugin-driven bootstrap framework for admin panels.
//!
//! ## Overview
//!
//! Plugins subscribe to a fixed sequence of lifecycle phases and communicate
//! through a shared registry of named repositories:
//!
//! ```text
//! set-config ──► start:after ──► start:init-plugin ──► start ──► start:before
//!     │                                │                 │
//!     ▼                                ▼                 ▼
//! Config/config              field types register   App/instance
//! Config/locals
//! ```
//!
//! - **AdminInterface**: loads the configuration and publishes the phases
//! - **Registry**: `App`, `Config`, `FieldType` and any plugin-defined repository
//! - **Field types**: render form inputs and optionally ship a `routing.yaml`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use admin_interface::prelude::*;
//!
//! let mut admin = AdminInterface::new();
//! admin.register_field_type::<TextField>();
//! admin.set_config_file(env!("CARGO_MANIFEST_DIR"), "admin.yaml")?;
//! let app = admin.middleware::<axum::Router>()?;
//! ```
//!
//! ## Features
//!
//! - `json-log`: JSON log output

pub use admin_core as core;
pub use admin_runtime as runtime;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use admin_interface::prelude::*;
/// ```
pub mod prelude {
    // Orchestrator
    pub use admin_runtime::{AdminInterface, AdminPlugin, RuntimeError, RuntimeResult};

    // Configuration
    pub use admin_runtime::{AdminConfig, ConfigLoader, DotfileDiscovery, RcDiscovery};

    // Lifecycle and registry
    pub use admin_core::registry::{
        APP_REPOSITORY, CONFIG_KEY, CONFIG_REPOSITORY, CWD_KEY, FIELD_TYPE_REPOSITORY,
        INSTANCE_KEY, LOCALS_KEY,
    };
    pub use admin_core::{
        AdminContext, BoxError, LifecycleBus, Phase, PhaseArgs, Registry, Repository,
    };

    // Field types
    pub use admin_core::{
        FieldAttrs, FieldContext, FieldError, FieldResult, FieldType, FieldTypeClass,
        RouteDefinition, RoutingType,
    };

    // Logging macros
    pub use admin_runtime::prelude::*;
}
