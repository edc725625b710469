//! Routing descriptors declared by field-type plugins.
//!
//! A plugin that needs HTTP sub-routes (an upload endpoint, an autocomplete
//! lookup) ships a `routing.yaml` next to its implementation:
//!
//! ```yaml
//! upload:
//!   path: /field/wysiwyg/upload
//!   method: POST
//!   controller: upload
//! preview:
//!   path: /field/wysiwyg/preview
//!   methods: [GET, POST]
//!   maxSize: 1048576
//! ```
//!
//! Keys other than `path`, `method`, `methods` and `controller` are kept as
//! route options for the host's router.
//!
//! # Caching
//!
//! [`RoutingCache`] resolves descriptors **per field-type subtype**, keyed by
//! `TypeId`. A parsed descriptor is memoised for the life of the cache and the
//! filesystem is never consulted again for that subtype. A missing file is
//! not memoised: every call re-checks, so a route file added later is picked
//! up on the next lookup.

use std::any::TypeId;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use figment::Figment;
use figment::providers::{Format, Yaml};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::error::{FieldError, FieldResult};

/// File name looked up in a plugin's directory.
pub const ROUTING_FILE: &str = "routing.yaml";

// =============================================================================
// RoutingType
// =============================================================================

/// One sub-route a field-type plugin wants mounted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDefinition {
    /// Route name (the top-level key in `routing.yaml`).
    pub name: String,
    /// URL path, as written.
    pub path: String,
    /// Upper-cased HTTP methods. Defaults to `["GET"]`.
    pub methods: Vec<String>,
    /// Controller or action identifier, interpreted by the host.
    pub controller: Option<String>,
    /// Any other keys of the route entry.
    pub options: Map<String, Value>,
}

/// Parsed routing descriptor of one field-type subtype.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingType {
    /// Directory the routing file was read from.
    pub source_dir: PathBuf,
    /// Routes sorted by name.
    pub routes: Vec<RouteDefinition>,
}

impl RoutingType {
    /// Looks up a route by name.
    pub fn route(&self, name: &str) -> Option<&RouteDefinition> {
        self.routes.iter().find(|route| route.name == name)
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MethodSpec {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawRoute {
    path: String,
    #[serde(default)]
    method: Option<MethodSpec>,
    #[serde(default)]
    methods: Option<MethodSpec>,
    #[serde(default)]
    controller: Option<String>,
    #[serde(flatten)]
    options: Map<String, Value>,
}

impl RawRoute {
    fn into_definition(self, name: String) -> RouteDefinition {
        let methods = match self.methods.or(self.method) {
            Some(MethodSpec::One(method)) => vec![method],
            Some(MethodSpec::Many(methods)) => methods,
            None => Vec::new(),
        };
        let mut methods: Vec<String> = methods.iter().map(|m| m.to_uppercase()).collect();
        if methods.is_empty() {
            methods.push("GET".to_string());
        }

        RouteDefinition {
            name,
            path: self.path,
            methods,
            controller: self.controller,
            options: self.options,
        }
    }
}

// =============================================================================
// RoutingSource
// =============================================================================

/// Where routing files come from.
///
/// The default [`YamlRoutingSource`] reads the filesystem. Tests substitute a
/// stub to observe how often the cache touches its source.
pub trait RoutingSource: Send + Sync {
    /// Returns `true` if a routing file exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// Parses `dir/file_name` into a descriptor.
    fn parse(&self, dir: &Path, file_name: &str) -> FieldResult<RoutingType>;
}

/// Reads `routing.yaml` files from disk through figment's YAML provider.
#[derive(Debug, Clone, Copy, Default)]
pub struct YamlRoutingSource;

impl RoutingSource for YamlRoutingSource {
    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn parse(&self, dir: &Path, file_name: &str) -> FieldResult<RoutingType> {
        let path = dir.join(file_name);
        let raw: BTreeMap<String, RawRoute> = Figment::from(Yaml::file(&path))
            .extract()
            .map_err(|e| FieldError::RoutingParse {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        let routes = raw
            .into_iter()
            .map(|(name, route)| route.into_definition(name))
            .collect();

        Ok(RoutingType {
            source_dir: dir.to_path_buf(),
            routes,
        })
    }
}

// =============================================================================
// RoutingCache
// =============================================================================

/// Lazily populated routing descriptors, one per field-type subtype.
pub struct RoutingCache {
    source: Box<dyn RoutingSource>,
    entries: HashMap<TypeId, Arc<RoutingType>>,
}

impl RoutingCache {
    /// Creates an empty cache over the filesystem.
    pub fn new() -> Self {
        Self::with_source(YamlRoutingSource)
    }

    /// Creates an empty cache over a custom source.
    pub fn with_source(source: impl RoutingSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            entries: HashMap::new(),
        }
    }

    /// Returns the descriptor for the subtype `type_id`.
    ///
    /// `this_path` is only called on a cache miss. Returns `Ok(None)` when the
    /// subtype's directory has no routing file.
    pub fn resolve(
        &mut self,
        type_id: TypeId,
        this_path: impl FnOnce() -> PathBuf,
    ) -> FieldResult<Option<Arc<RoutingType>>> {
        if let Some(routing) = self.entries.get(&type_id) {
            trace!(?type_id, "Routing cache hit");
            return Ok(Some(Arc::clone(routing)));
        }

        let dir = this_path();
        let routing_path = dir.join(ROUTING_FILE);
        if !self.source.exists(&routing_path) {
            trace!(path = %routing_path.display(), "No routing file");
            return Ok(None);
        }

        let routing = Arc::new(self.source.parse(&dir, ROUTING_FILE)?);
        debug!(
            path = %routing_path.display(),
            routes = routing.routes.len(),
            "Routing file parsed and cached"
        );
        self.entries.insert(type_id, Arc::clone(&routing));
        Ok(Some(routing))
    }

    /// Returns an already cached descriptor without touching the source.
    pub fn cached(&self, type_id: TypeId) -> Option<Arc<RoutingType>> {
        self.entries.get(&type_id).cloned()
    }

    /// Number of subtypes with a cached descriptor.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RoutingCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RoutingCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RoutingCache")
            .field("entries", &self.entries.len())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::*;

    /// Counts source calls; `exists` can be switched to panic after use.
    #[derive(Clone, Default)]
    struct CountingSource {
        present: bool,
        exists_calls: Arc<AtomicUsize>,
        parse_calls: Arc<AtomicUsize>,
        broken: Arc<AtomicBool>,
    }

    impl RoutingSource for CountingSource {
        fn exists(&self, _path: &Path) -> bool {
            assert!(!self.broken.load(Ordering::SeqCst), "filesystem unavailable");
            self.exists_calls.fetch_add(1, Ordering::SeqCst);
            self.present
        }

        fn parse(&self, dir: &Path, _file_name: &str) -> FieldResult<RoutingType> {
            self.parse_calls.fetch_add(1, Ordering::SeqCst);
            Ok(RoutingType {
                source_dir: dir.to_path_buf(),
                routes: Vec::new(),
            })
        }
    }

    struct Wysiwyg;
    struct Plain;

    #[test]
    fn test_positive_result_is_cached() {
        let source = CountingSource {
            present: true,
            ..Default::default()
        };
        let mut cache = RoutingCache::with_source(source.clone());
        let id = TypeId::of::<Wysiwyg>();

        let first = cache.resolve(id, || PathBuf::from("/plugins/wysiwyg")).unwrap();
        source.broken.store(true, Ordering::SeqCst);
        let second = cache
            .resolve(id, || panic!("path must not be recomputed"))
            .unwrap();

        let (first, second) = (first.unwrap(), second.unwrap());
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(source.parse_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.exists_calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_negative_result_is_rechecked() {
        let source = CountingSource::default();
        let mut cache = RoutingCache::with_source(source.clone());
        let id = TypeId::of::<Plain>();

        assert!(cache.resolve(id, || PathBuf::from("/plugins/plain")).unwrap().is_none());
        assert!(cache.resolve(id, || PathBuf::from("/plugins/plain")).unwrap().is_none());

        assert_eq!(source.exists_calls.load(Ordering::SeqCst), 2);
        assert_eq!(source.parse_calls.load(Ordering::SeqCst), 0);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_is_per_subtype() {
        let source = CountingSource {
            present: true,
            ..Default::default()
        };
        let mut cache = RoutingCache::with_source(source.clone());

        cache.resolve(TypeId::of::<Wysiwyg>(), || PathBuf::from("/a")).unwrap();
        cache.resolve(TypeId::of::<Plain>(), || PathBuf::from("/b")).unwrap();

        assert_eq!(cache.len(), 2);
        assert_eq!(
            cache.cached(TypeId::of::<Plain>()).unwrap().source_dir,
            PathBuf::from("/b")
        );
    }

    #[test]
    fn test_yaml_source_parses_routes() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(ROUTING_FILE),
            "upload:\n  path: /field/wysiwyg/upload\n  method: post\n  controller: upload\n  maxSize: 1024\n\
             preview:\n  path: /field/wysiwyg/preview\n  methods: [GET, POST]\n",
        )
        .unwrap();

        let mut cache = RoutingCache::new();
        let routing = cache
            .resolve(TypeId::of::<Wysiwyg>(), || dir.path().to_path_buf())
            .unwrap()
            .unwrap();

        assert_eq!(routing.routes.len(), 2);
        let upload = routing.route("upload").unwrap();
        assert_eq!(upload.methods, vec!["POST"]);
        assert_eq!(upload.controller.as_deref(), Some("upload"));
        assert_eq!(upload.options.get("maxSize"), Some(&Value::from(1024)));

        let preview = routing.route("preview").unwrap();
        assert_eq!(preview.methods, vec!["GET", "POST"]);
        assert!(preview.controller.is_none());
    }

    #[test]
    fn test_yaml_source_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(ROUTING_FILE), "upload:\n  method: POST\n").unwrap();

        let err = YamlRoutingSource
            .parse(dir.path(), ROUTING_FILE)
            .unwrap_err();
        assert!(matches!(err, FieldError::RoutingParse { .. }));
    }
}
