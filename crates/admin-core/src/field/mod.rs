//! Field-type plugin contract.
//!
//! A field type knows how to present one kind of data attribute, such as plain
//! text or a date. Every concrete field type has two
//! halves:
//!
//! - [`FieldTypeClass`]: **class-level** facts shared by all instances, namely
//!   the type key and the plugin's own directory (where its `view.jade` and
//!   optional `routing.yaml` live).
//! - [`FieldType`]: the **instance**: [`FieldAttrs`] plus `render`.
//!
//! Both methods a plugin must supply (`this_path`, `render`) are required
//! trait items, so a field type that forgets one does not compile.
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct TextField { attrs: FieldAttrs }
//!
//! impl FieldTypeClass for TextField {
//!     const TYPE_KEY: &'static str = "text";
//!     fn this_path() -> PathBuf {
//!         PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fields/text")
//!     }
//! }
//!
//! impl FieldType for TextField {
//!     fn attrs(&self) -> &FieldAttrs { &self.attrs }
//!     fn attrs_mut(&mut self) -> &mut FieldAttrs { &mut self.attrs }
//!
//!     fn render(&self, registry: &Registry, item: Option<&Value>) -> FieldResult<String> {
//!         let value = self.value_from_object(item).and_then(Value::as_str).unwrap_or_default();
//!         Ok(format!("<span>{value}</span>"))
//!     }
//! }
//!
//! ctx.field_types_mut().register(FieldTypeDescriptor::of::<TextField>());
//! ```

pub mod attrs;
pub mod context;
pub mod descriptor;
pub mod registry;
pub mod routing;

use std::path::PathBuf;

use serde_json::Value;

use crate::error::FieldResult;
use crate::registry::Registry;

pub use attrs::{FieldAttrs, PersistenceBinding};
pub use context::{FIELD_CONTEXT_KEY, FieldContext};
pub use descriptor::FieldTypeDescriptor;
pub use registry::FieldTypeRegistry;
pub use routing::{
    ROUTING_FILE, RouteDefinition, RoutingCache, RoutingSource, RoutingType, YamlRoutingSource,
};

/// File name of a field type's view template, relative to [`FieldTypeClass::this_path`].
pub const VIEW_TEMPLATE_FILE: &str = "view.jade";

/// Class-level half of a field type.
pub trait FieldTypeClass: 'static {
    /// Identifier the field type is registered under.
    const TYPE_KEY: &'static str;

    /// Directory holding the plugin's templates and routing file.
    fn this_path() -> PathBuf;

    /// Path of the plugin's view template. No existence check.
    fn this_path_view() -> PathBuf {
        Self::this_path().join(VIEW_TEMPLATE_FILE)
    }
}

/// Instance half of a field type.
pub trait FieldType: Send + Sync {
    fn attrs(&self) -> &FieldAttrs;

    fn attrs_mut(&mut self) -> &mut FieldAttrs;

    /// Renders the field for `item` (absent for a new item).
    fn render(&self, registry: &Registry, item: Option<&Value>) -> FieldResult<String>;

    /// See [`FieldAttrs::context`].
    fn context<'a>(&'a self, registry: &Registry) -> FieldContext<'a> {
        self.attrs().context(registry)
    }

    /// See [`FieldAttrs::value_from_object`].
    fn value_from_object<'v>(&self, item: Option<&'v Value>) -> Option<&'v Value> {
        self.attrs().value_from_object(item)
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Minimal field type used across the module's tests.
    #[derive(Default)]
    pub struct EchoField {
        pub attrs: FieldAttrs,
    }

    impl FieldTypeClass for EchoField {
        const TYPE_KEY: &'static str = "echo";

        fn this_path() -> PathBuf {
            PathBuf::from("/plugins/echo")
        }
    }

    impl FieldType for EchoField {
        fn attrs(&self) -> &FieldAttrs {
            &self.attrs
        }

        fn attrs_mut(&mut self) -> &mut FieldAttrs {
            &mut self.attrs
        }

        fn render(&self, registry: &Registry, item: Option<&Value>) -> FieldResult<String> {
            let ctx = self.context(registry);
            let prefix = ctx.get("prefix").and_then(Value::as_str).unwrap_or("");
            let value = self
                .value_from_object(item)
                .map(Value::to_string)
                .unwrap_or_default();
            Ok(format!("{prefix}{value}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::testing::EchoField;
    use super::*;
    use crate::registry::{CONFIG_REPOSITORY, LOCALS_KEY};

    #[test]
    fn test_this_path_view_joins_template_name() {
        assert_eq!(
            EchoField::this_path_view(),
            PathBuf::from("/plugins/echo/view.jade")
        );
    }

    #[test]
    fn test_render_uses_value_and_context() {
        let mut registry = Registry::new();
        registry.repository_mut(CONFIG_REPOSITORY).set(
            LOCALS_KEY,
            json!({ "prefix": "> " }).as_object().cloned().unwrap(),
        );

        let mut field = EchoField::default();
        field.attrs_mut().set_field("value");

        let item = json!({ "field": "x", "value": "v" });
        assert_eq!(field.render(&registry, Some(&item)).unwrap(), "> \"v\"");
        assert_eq!(field.render(&registry, None).unwrap(), "> ");
    }
}
