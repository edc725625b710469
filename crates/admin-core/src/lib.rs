//! # Admin Core
//!
//! Extensibility core of the Admin Interface framework.
//!
//! This crate provides:
//! - [`Registry`]: named key/value repositories shared by all plugins
//! - [`LifecycleBus`]: ordered, synchronous publish/subscribe over bootstrap [`Phase`]s
//! - [`AdminContext`]: the explicit context threaded to every lifecycle handler
//! - The field-type plugin contract ([`FieldType`], [`FieldTypeClass`]) and
//!   the per-subtype [`RoutingCache`]
//!
//! Configuration loading, rc-file discovery and the orchestrator live in
//! admin-runtime.

pub mod context;
pub mod error;
pub mod field;
pub mod lifecycle;
pub mod merge;
pub mod registry;

pub use context::AdminContext;
pub use error::{
    BoxError, FieldError, FieldResult, LifecycleError, LifecycleResult, RegistryError,
    RegistryResult,
};
pub use field::{
    FieldAttrs, FieldContext, FieldType, FieldTypeClass, FieldTypeDescriptor, FieldTypeRegistry,
    RouteDefinition, RoutingCache, RoutingSource, RoutingType, VIEW_TEMPLATE_FILE,
    YamlRoutingSource,
};
pub use lifecycle::{LifecycleBus, Phase, PhaseArgs, PhaseHandler};
pub use merge::{deep_merge, merge_maps};
pub use registry::{Registry, RegistryValue, Repository};
