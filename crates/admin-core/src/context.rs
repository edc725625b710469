//! The explicit context threaded through a bootstrap run.

use crate::field::{FieldTypeRegistry, RoutingSource};
use crate::registry::Registry;

/// Shared state handed to every lifecycle handler.
///
/// Owns the named [`Registry`] and the [`FieldTypeRegistry`] (which in turn
/// owns the per-subtype routing cache). Any handler may read or write either
/// during bootstrap.
#[derive(Debug, Default)]
pub struct AdminContext {
    registry: Registry,
    field_types: FieldTypeRegistry,
}

impl AdminContext {
    /// Creates an empty context reading routing files from the filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty context resolving routing files through `source`.
    pub fn with_routing_source(source: impl RoutingSource + 'static) -> Self {
        Self {
            registry: Registry::new(),
            field_types: FieldTypeRegistry::with_source(source),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn field_types(&self) -> &FieldTypeRegistry {
        &self.field_types
    }

    pub fn field_types_mut(&mut self) -> &mut FieldTypeRegistry {
        &mut self.field_types
    }

    /// Borrows both halves at once, for handlers that render while registering.
    pub fn split_mut(&mut self) -> (&mut Registry, &mut FieldTypeRegistry) {
        (&mut self.registry, &mut self.field_types)
    }
}
