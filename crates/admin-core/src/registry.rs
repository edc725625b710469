//! Named registry of key/value repositories.
//!
//! The [`Registry`] is the single shared-state surface of a bootstrap run.
//! Plugins find each other only through agreed repository and key names, so
//! registration order and usage order stay decoupled.
//!
//! Values are stored type-erased (`Arc<dyn Any + Send + Sync>`) and recovered
//! by downcast on the way out:
//!
//! ```rust,ignore
//! let mut registry = Registry::new();
//! registry.repository_mut("App").set("cwd", PathBuf::from("/srv/admin"));
//!
//! let cwd: Arc<PathBuf> = registry.repository("App")?.require("cwd")?;
//! ```
//!
//! # Write window
//!
//! Any subscriber may read or overwrite any entry. By convention writes happen
//! only while lifecycle phases are being published; after `start()` returns the
//! registry is treated as read-only. The convention is not enforced.

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::error::{RegistryError, RegistryResult};

/// Repository holding application-level handles (`cwd`, `instance`).
pub const APP_REPOSITORY: &str = "App";
/// Repository holding the parsed configuration and template locals.
pub const CONFIG_REPOSITORY: &str = "Config";
/// Repository field-type plugins may use for shared plugin state.
pub const FIELD_TYPE_REPOSITORY: &str = "FieldType";

/// `App` key: base directory passed to `set_config_file`.
pub const CWD_KEY: &str = "cwd";
/// `App` key: the mountable request handler created during start phases.
pub const INSTANCE_KEY: &str = "instance";
/// `Config` key: global template locals joined into every field context.
pub const LOCALS_KEY: &str = "locals";
/// `Config` key: the whole parsed configuration.
pub const CONFIG_KEY: &str = "config";

/// Type-erased value stored in a repository.
pub type RegistryValue = Arc<dyn Any + Send + Sync>;

// =============================================================================
// Repository
// =============================================================================

/// A single named key/value store inside the [`Registry`].
pub struct Repository {
    name: String,
    entries: HashMap<String, RegistryValue>,
}

impl Repository {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            entries: HashMap::new(),
        }
    }

    /// Returns the repository name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn set<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: T) {
        self.set_arc(key, Arc::new(value));
    }

    /// Stores an already shared value under `key`.
    pub fn set_arc<T: Any + Send + Sync>(&mut self, key: impl Into<String>, value: Arc<T>) {
        let key = key.into();
        trace!(repository = %self.name, key = %key, "Registry write");
        self.entries.insert(key, value);
    }

    /// Returns the value under `key`, or `None` when it is missing or of another type.
    pub fn get<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.entries
            .get(key)
            .and_then(|value| Arc::clone(value).downcast::<T>().ok())
    }

    /// Returns the value under `key`, failing when it is missing or of another type.
    pub fn require<T: Any + Send + Sync>(&self, key: &str) -> RegistryResult<Arc<T>> {
        let value = self
            .entries
            .get(key)
            .ok_or_else(|| RegistryError::KeyNotFound {
                repository: self.name.clone(),
                key: key.to_string(),
            })?;

        Arc::clone(value)
            .downcast::<T>()
            .map_err(|_| RegistryError::TypeMismatch {
                repository: self.name.clone(),
                key: key.to_string(),
                expected: type_name::<T>(),
            })
    }

    /// Returns `true` if any value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes and returns the raw value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<RegistryValue> {
        self.entries.remove(key)
    }

    /// Returns all keys, in no particular order.
    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("name", &self.name)
            .field("keys", &self.keys())
            .finish()
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Collection of all repositories for one bootstrap run.
#[derive(Debug, Default)]
pub struct Registry {
    repositories: HashMap<String, Repository>,
}

impl Registry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the repository `name`, creating an empty one on first access.
    pub fn repository_mut(&mut self, name: &str) -> &mut Repository {
        self.repositories
            .entry(name.to_string())
            .or_insert_with(|| Repository::new(name))
    }

    /// Looks up an existing repository without creating it.
    pub fn repository(&self, name: &str) -> RegistryResult<&Repository> {
        self.repositories
            .get(name)
            .ok_or_else(|| RegistryError::RepositoryNotFound(name.to_string()))
    }

    /// Returns `true` if the repository `name` has been created.
    pub fn contains(&self, name: &str) -> bool {
        self.repositories.contains_key(name)
    }

    /// Returns the names of all created repositories.
    pub fn names(&self) -> Vec<&str> {
        self.repositories.keys().map(String::as_str).collect()
    }

    /// Drops every repository. Intended for test isolation.
    pub fn clear(&mut self) {
        self.repositories.clear();
    }
}

// =============================================================================
// Tests
// =============================================================================
