//! Builds the axum application during the `start` phase.

use std::collections::HashSet;
use std::sync::Arc;

use admin_interface::core::FieldTypeRegistry;
use admin_interface::prelude::*;
use axum::Router;
use axum::http::Method;
use axum::response::Html;
use axum::routing::{MethodFilter, get, on};
use axum::Json;
use serde_json::{Value, json};

/// Stores the application router under `App/instance`.
pub struct RouterPlugin;

impl AdminPlugin for RouterPlugin {
    fn subscribe(&self, bus: &mut LifecycleBus) {
        bus.subscribe(Phase::Start, |ctx, _| {
            let router = build_router(ctx)?;
            ctx.registry_mut()
                .repository_mut(APP_REPOSITORY)
                .set(INSTANCE_KEY, router);
            Ok(())
        });
    }
}

fn build_router(ctx: &mut AdminContext) -> Result<Router, BoxError> {
    let (registry, field_types) = ctx.split_mut();

    let page: Arc<str> = render_models(registry, field_types)?.into();
    let mut router = Router::new().route(
        "/",
        get(move || {
            let page = Arc::clone(&page);
            async move { Html(page.to_string()) }
        }),
    );

    let mut paths = HashSet::new();
    for (type_key, routing) in field_types.routings()? {
        for route in &routing.routes {
            if !route.path.starts_with('/') || !paths.insert(route.path.clone()) {
                return Err(format!("invalid or duplicate route path '{}'", route.path).into());
            }
            let Some(filter) = method_filter(&route.methods)? else {
                continue;
            };

            let body = Json(json!({
                "fieldType": type_key,
                "route": route.name,
                "controller": route.controller,
                "options": route.options,
            }));
            router = router.route(
                &route.path,
                on(filter, move || {
                    let body = body.clone();
                    async move { body }
                }),
            );
            debug!(field_type = type_key, route = %route.name, path = %route.path, "Route mounted");
        }
    }

    Ok(router)
}

fn method_filter(methods: &[String]) -> Result<Option<MethodFilter>, BoxError> {
    let mut filter: Option<MethodFilter> = None;
    for name in methods {
        let method = Method::from_bytes(name.as_bytes())?;
        let next = MethodFilter::try_from(method)?;
        filter = Some(filter.map_or(next, |acc| acc.or(next)));
    }
    Ok(filter)
}

/// Renders every typed field of every configured model as an empty form.
fn render_models(
    registry: &Registry,
    field_types: &FieldTypeRegistry,
) -> Result<String, BoxError> {
    let config = registry
        .repository(CONFIG_REPOSITORY)?
        .require::<Value>(CONFIG_KEY)?;
    let site = config["locals"]["siteName"].as_str().unwrap_or("Admin");

    let mut html = format!("<h1>{site}</h1>");
    let Some(models) = config.get("models").and_then(Value::as_object) else {
        return Ok(html);
    };

    for (model_key, model) in models {
        let title = model["title"].as_str().unwrap_or(model_key);
        html.push_str(&format!("<form data-model=\"{model_key}\"><h2>{title}</h2>"));

        let fields = model.get("fields").and_then(Value::as_object);
        for (name, definition) in fields.into_iter().flatten() {
            let Some(type_key) = definition.get("type").and_then(Value::as_str) else {
                warn!(model = %model_key, field = %name, "Field without type skipped");
                continue;
            };
            let mut field = field_types.create(type_key)?;
            field
                .attrs_mut()
                .configure(definition)?
                .set_model_key(model_key.as_str())
                .set_field(name.as_str());
            html.push_str(&field.render(registry, None)?);
        }
        html.push_str("</form>");
    }
    Ok(html)
}
