use serde_json::{Map, Value};

use super::attrs::FieldAttrs;

/// Key under which the field itself appears in [`FieldContext::to_json`].
pub const FIELD_CONTEXT_KEY: &str = "$field";

/// Render-time context: the field instance plus a snapshot of global locals.
#[derive(Debug, Clone)]
pub struct FieldContext<'a> {
    field: &'a FieldAttrs,
    locals: Map<String, Value>,
}

impl<'a> FieldContext<'a> {
    pub(crate) fn new(field: &'a FieldAttrs, locals: Map<String, Value>) -> Self {
        Self { field, locals }
    }

    /// Returns the field being rendered.
    pub fn field(&self) -> &'a FieldAttrs {
        self.field
    }

    /// Returns the template locals captured when the context was built.
    pub fn locals(&self) -> &Map<String, Value> {
        &self.locals
    }

    /// Looks up a single local.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.locals.get(key)
    }

    /// Flattens the context into one mapping for a template engine.
    ///
    /// `$field` is inserted first and locals after it, so a local that is
    /// itself named `$field` takes precedence.
    pub fn to_json(&self) -> Value {
        let mut map = Map::with_capacity(self.locals.len() + 1);
        map.insert(FIELD_CONTEXT_KEY.to_string(), self.field.to_json());
        map.extend(self.locals.clone());
        Value::Object(map)
    }
}
