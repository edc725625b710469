//! Text Field Demo
//!
//! Registers a `text` field type and a router plugin, bootstraps them from
//! `admin.yaml` and serves the resulting axum application.
//!
//! # Usage
//!
//! ```bash
//! cargo run --package text-field-demo
//! ```
//!
//! Then open `http://127.0.0.1:3000/` for the rendered forms, or
//! `GET /field/text/autocomplete` for a route declared in
//! `fields/text/routing.yaml`.

mod app;
mod text;

use std::sync::Arc;

use admin_interface::prelude::*;
use anyhow::Result;
use axum::Router;
use serde_json::Value;

use app::RouterPlugin;
use text::TextField;

const DEFAULT_ADDR: &str = "127.0.0.1:3000";

#[tokio::main]
async fn main() -> Result<()> {
    let mut admin = AdminInterface::new();
    admin
        .register_field_type::<TextField>()
        .register_plugin(&RouterPlugin);
    admin.set_config_file(env!("CARGO_MANIFEST_DIR"), "admin.yaml")?;

    let router = admin.middleware::<Router>()?;

    let addr = admin
        .config()
        .and_then(|config| config.section("server"))
        .and_then(|server| server.get("addr"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_ADDR)
        .to_string();

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(addr = %listener.local_addr()?, "Admin demo listening");

    axum::serve(listener, Arc::unwrap_or_clone(router)).await?;
    Ok(())
}
