//! Per-instance state shared by every field type.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value, json};
use tracing::debug;

use super::context::FieldContext;
use crate::error::{FieldError, FieldResult};
use crate::merge::merge_maps;
use crate::registry::{CONFIG_REPOSITORY, LOCALS_KEY, Registry};

/// Opaque handle to whatever the data layer uses to read and write a field.
pub type PersistenceBinding = Arc<dyn Any + Send + Sync>;

/// Identity and presentation attributes of one field-type instance.
///
/// | Attribute | Meaning |
/// |-----------|---------|
/// | `key` | field-type identifier (`"text"`, `"wysiwyg"`, ...) |
/// | `model_key` | owning data model |
/// | `field` | attribute name on the data item |
/// | `title` | label shown in the UI |
/// | `default_value` | value used for new items |
/// | `disabled` | read-only in forms |
/// | `options` | free-form, deep-merged on every update |
#[derive(Clone, Default)]
pub struct FieldAttrs {
    key: String,
    model_key: String,
    field: String,
    title: String,
    default_value: Value,
    disabled: bool,
    options: Map<String, Value>,
    persistence_binding: Option<PersistenceBinding>,
}

impl FieldAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_key(&mut self, key: impl Into<String>) -> &mut Self {
        self.key = key.into();
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn set_model_key(&mut self, model_key: impl Into<String>) -> &mut Self {
        self.model_key = model_key.into();
        self
    }

    pub fn model_key(&self) -> &str {
        &self.model_key
    }

    pub fn set_field(&mut self, field: impl Into<String>) -> &mut Self {
        self.field = field.into();
        self
    }

    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn set_title(&mut self, title: impl Into<String>) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_default_value(&mut self, value: Value) -> &mut Self {
        self.default_value = value;
        self
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    pub fn set_disabled(&mut self, disabled: bool) -> &mut Self {
        self.disabled = disabled;
        self
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Deep-merges `options` into the current options.
    ///
    /// Calls are cumulative: a key set once survives every later call that does
    /// not write the same path. There is no way to unset a key.
    pub fn set_options(&mut self, options: &Map<String, Value>) -> &mut Self {
        merge_maps(&mut self.options, options);
        self
    }

    pub fn options(&self) -> &Map<String, Value> {
        &self.options
    }

    pub fn set_persistence_binding(&mut self, binding: PersistenceBinding) -> &mut Self {
        self.persistence_binding = Some(binding);
        self
    }

    pub fn persistence_binding(&self) -> Option<&PersistenceBinding> {
        self.persistence_binding.as_ref()
    }

    /// Downcasts the persistence binding to the data layer's concrete type.
    pub fn persistence_binding_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.persistence_binding
            .as_ref()
            .and_then(|binding| Arc::clone(binding).downcast::<T>().ok())
    }

    /// Applies an untyped field definition, as written in a model file.
    ///
    /// A recognised attribute with a value of the wrong JSON type is rejected
    /// with [`FieldError::InvalidType`]; nothing is applied in that case.
    /// Unrecognised attributes are skipped.
    ///
    /// ```yaml
    /// title: Body
    /// field: body
    /// disabled: false
    /// options:
    ///   editor: { toolbar: full }
    /// ```
    pub fn configure(&mut self, definition: &Value) -> FieldResult<&mut Self> {
        let definition = definition.as_object().ok_or(FieldError::InvalidType {
            attribute: "definition",
            expected: "object",
        })?;

        // Validate everything first so a bad definition leaves no partial update.
        let mut staged = self.clone();
        for (name, value) in definition {
            match name.as_str() {
                "key" => {
                    staged.key = expect_str("key", value)?.to_string();
                }
                "modelKey" => {
                    staged.model_key = expect_str("modelKey", value)?.to_string();
                }
                "field" => {
                    staged.field = expect_str("field", value)?.to_string();
                }
                "title" => {
                    staged.title = expect_str("title", value)?.to_string();
                }
                "default" | "defaultValue" => {
                    staged.default_value = value.clone();
                }
                "disabled" => {
                    staged.disabled = value.as_bool().ok_or(FieldError::InvalidType {
                        attribute: "disabled",
                        expected: "boolean",
                    })?;
                }
                "options" => {
                    let options = value.as_object().ok_or(FieldError::InvalidType {
                        attribute: "options",
                        expected: "object",
                    })?;
                    merge_maps(&mut staged.options, options);
                }
                other => {
                    debug!(attribute = %other, field = %self.field, "Ignoring unknown field attribute");
                }
            }
        }

        *self = staged;
        Ok(self)
    }

    /// Extracts this field's attribute from a data item.
    ///
    /// Returns `None` when the item is absent, `null`, not an object, or lacks
    /// the attribute. Never fails.
    pub fn value_from_object<'a>(&self, item: Option<&'a Value>) -> Option<&'a Value> {
        item.and_then(Value::as_object)
            .and_then(|object| object.get(&self.field))
    }

    /// Builds a render context joining `$field` with the current `Config/locals`.
    ///
    /// The join is recomputed on every call. A missing repository or key yields
    /// empty locals.
    pub fn context<'a>(&'a self, registry: &Registry) -> FieldContext<'a> {
        let locals = registry
            .repository(CONFIG_REPOSITORY)
            .ok()
            .and_then(|repo| repo.get::<Map<String, Value>>(LOCALS_KEY))
            .map(|locals| (*locals).clone())
            .unwrap_or_default();
        FieldContext::new(self, locals)
    }

    /// Serialises the attributes for template engines.
    pub fn to_json(&self) -> Value {
        json!({
            "key": self.key,
            "modelKey": self.model_key,
            "field": self.field,
            "title": self.title,
            "defaultValue": self.default_value,
            "disabled": self.disabled,
            "options": self.options,
        })
    }
}

fn expect_str<'v>(attribute: &'static str, value: &'v Value) -> FieldResult<&'v str> {
    value.as_str().ok_or(FieldError::InvalidType {
        attribute,
        expected: "string",
    })
}

impl fmt::Debug for FieldAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldAttrs")
            .field("key", &self.key)
            .field("model_key", &self.model_key)
            .field("field", &self.field)
            .field("title", &self.title)
            .field("default_value", &self.default_value)
            .field("disabled", &self.disabled)
            .field("options", &self.options)
            .field("has_persistence_binding", &self.persistence_binding.is_some())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
