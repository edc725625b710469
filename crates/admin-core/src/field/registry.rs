//! Registry of field-type subtypes and their routing descriptors.
//!
//! [`FieldTypeRegistry`] is filled by plugins during `start:init-plugin` and
//! read by the rendering pipeline afterwards. It owns the [`RoutingCache`], so
//! routing descriptors are shared by every instance of a subtype rather than
//! stored per instance.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{info, trace, warn};

use super::descriptor::FieldTypeDescriptor;
use super::routing::{RoutingCache, RoutingSource, RoutingType};
use super::{FieldType, FieldTypeClass};
use crate::error::{FieldError, FieldResult};

/// Field-type subtypes keyed by [`FieldTypeClass::TYPE_KEY`].
#[derive(Debug, Default)]
pub struct FieldTypeRegistry {
    descriptors: HashMap<&'static str, FieldTypeDescriptor>,
    /// Registration order, for deterministic iteration.
    order: Vec<&'static str>,
    routing: RoutingCache,
}

impl FieldTypeRegistry {
    /// Creates an empty registry reading routing files from disk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty registry reading routing files through `source`.
    pub fn with_source(source: impl RoutingSource + 'static) -> Self {
        Self {
            descriptors: HashMap::new(),
            order: Vec::new(),
            routing: RoutingCache::with_source(source),
        }
    }

    /// Registers a subtype. A later registration under the same key wins.
    ///
    /// Returns `true` if another subtype held the key. Registering the same
    /// subtype again is a no-op.
    pub fn register(&mut self, descriptor: FieldTypeDescriptor) -> bool {
        let key = descriptor.type_key;
        match self.descriptors.insert(key, descriptor) {
            Some(previous) if previous.type_id == descriptor.type_id => {
                trace!(field_type = key, "Field type already registered");
                false
            }
            Some(previous) => {
                warn!(
                    field_type = key,
                    previous = previous.type_name,
                    replacement = descriptor.type_name,
                    "Duplicate field type, last registration wins"
                );
                true
            }
            None => {
                self.order.push(key);
                info!(field_type = key, "Field type registered");
                false
            }
        }
    }

    /// Registers the subtype `T`. See [`register`](Self::register).
    pub fn register_type<T>(&mut self) -> bool
    where
        T: FieldTypeClass + FieldType + Default,
    {
        self.register(FieldTypeDescriptor::of::<T>())
    }

    pub fn descriptor(&self, key: &str) -> Option<&FieldTypeDescriptor> {
        self.descriptors.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.descriptors.contains_key(key)
    }

    /// Registered keys in registration order.
    pub fn keys(&self) -> &[&'static str] {
        &self.order
    }

    /// Creates a new instance of the subtype registered under `key`.
    pub fn create(&self, key: &str) -> FieldResult<Box<dyn FieldType>> {
        self.descriptors
            .get(key)
            .map(FieldTypeDescriptor::instantiate)
            .ok_or_else(|| FieldError::UnknownFieldType(key.to_string()))
    }

    /// Resolves the routing descriptor of the subtype registered under `key`.
    pub fn routing(&mut self, key: &str) -> FieldResult<Option<Arc<RoutingType>>> {
        let descriptor = *self
            .descriptors
            .get(key)
            .ok_or_else(|| FieldError::UnknownFieldType(key.to_string()))?;
        self.routing.resolve(descriptor.type_id, descriptor.this_path)
    }

    /// Resolves the routing descriptor of the subtype `T`, registered or not.
    pub fn routing_for<T: FieldTypeClass>(&mut self) -> FieldResult<Option<Arc<RoutingType>>> {
        self.routing.resolve(std::any::TypeId::of::<T>(), T::this_path)
    }

    /// Resolves the descriptors of every registered subtype that has one.
    ///
    /// Stops at the first routing file that fails to parse.
    pub fn routings(&mut self) -> FieldResult<Vec<(&'static str, Arc<RoutingType>)>> {
        let mut resolved = Vec::new();
        for key in self.order.clone() {
            if let Some(routing) = self.routing(key)? {
                resolved.push((key, routing));
            }
        }
        Ok(resolved)
    }

    pub fn routing_cache(&self) -> &RoutingCache {
        &self.routing
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}

// =============================================================================
// Tests
// =============================================================================
