//! Built-in `set-config` subscriber.
//!
//! Stores the parsed configuration under `Config/config` and its `locals`
//! section under `Config/locals`, where field render contexts read them.

use serde_json::{Map, Value};
use tracing::debug;

use admin_core::registry::{
    APP_REPOSITORY, CONFIG_KEY, CONFIG_REPOSITORY, FIELD_TYPE_REPOSITORY, LOCALS_KEY,
};
use admin_core::{AdminContext, BoxError, LifecycleBus, Phase, PhaseArgs};

/// Subscribes the installation handler. Must run before any user handler.
pub fn install(bus: &mut LifecycleBus) {
    bus.subscribe(Phase::SetConfig, store_config);
}

fn store_config(ctx: &mut AdminContext, args: &PhaseArgs<'_>) -> Result<(), BoxError> {
    let registry = ctx.registry_mut();
    registry.repository_mut(APP_REPOSITORY);
    registry.repository_mut(FIELD_TYPE_REPOSITORY);

    let Some(config) = args.config() else {
        debug!("set-config published without a configuration payload");
        return Ok(());
    };

    let locals = config
        .get(LOCALS_KEY)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_else(Map::new);

    let repo = registry.repository_mut(CONFIG_REPOSITORY);
    debug!(locals = locals.len(), "Storing configuration");
    repo.set(CONFIG_KEY, config.clone());
    repo.set(LOCALS_KEY, locals);
    Ok(())
}
