//! The `text` field type.

use std::fmt::Write;
use std::path::PathBuf;

use admin_interface::prelude::*;
use serde_json::Value;

/// A single-line text input.
#[derive(Default)]
pub struct TextField {
    attrs: FieldAttrs,
}

impl FieldTypeClass for TextField {
    const TYPE_KEY: &'static str = "text";

    fn this_path() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fields/text")
    }
}

impl FieldType for TextField {
    fn attrs(&self) -> &FieldAttrs {
        &self.attrs
    }

    fn attrs_mut(&mut self) -> &mut FieldAttrs {
        &mut self.attrs
    }

    fn render(&self, registry: &Registry, item: Option<&Value>) -> FieldResult<String> {
        let ctx = self.context(registry);
        let field = ctx.field();
        let value = match self.value_from_object(item) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Null) | None => field.default_value().as_str().unwrap_or("").to_string(),
            Some(other) => other.to_string(),
        };

        let mut html = String::new();
        write!(
            html,
            r#"<label for="{name}">{title}</label><input type="text" name="{name}" value="{value}""#,
            name = escape(field.field()),
            title = escape(field.title()),
            value = escape(&value),
        )
        .map_err(|e| FieldError::render(e.to_string()))?;

        if let Some(placeholder) = field.options().get("placeholder").and_then(Value::as_str) {
            write!(html, r#" placeholder="{}""#, escape(placeholder))
                .map_err(|e| FieldError::render(e.to_string()))?;
        }
        if field.is_disabled() {
            html.push_str(" disabled");
        }
        html.push('>');
        Ok(html)
    }
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_render_escapes_value_and_applies_options() {
        let mut registry = Registry::new();
        registry
            .repository_mut(CONFIG_REPOSITORY)
            .set(LOCALS_KEY, serde_json::Map::new());

        let mut field = TextField::default();
        field
            .attrs_mut()
            .set_field("title")
            .set_title("Title")
            .set_disabled(true)
            .set_options(json!({ "placeholder": "Headline" }).as_object().unwrap());

        let html = field
            .render(&registry, Some(&json!({ "title": "<b>Hi</b>" })))
            .unwrap();

        assert!(html.contains(r#"value="&lt;b&gt;Hi&lt;/b&gt;""#));
        assert!(html.contains(r#"placeholder="Headline""#));
        assert!(html.ends_with(" disabled>"));
    }

    #[test]
    fn test_new_item_uses_default_value() {
        let mut field = TextField::default();
        field
            .attrs_mut()
            .set_field("title")
            .set_default_value(json!("Untitled"));

        let html = field.render(&Registry::new(), None).unwrap();
        assert!(html.contains(r#"value="Untitled""#));
    }
}
