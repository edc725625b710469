//! Bootstrap orchestration.
//!
//! [`AdminInterface`] drives the lifecycle: an optional `set-config` (from an
//! explicit file or the rc file), then the start phases in their fixed order.
//! The host retrieves the request handler a `start` subscriber stored under
//! `App/instance` through [`AdminInterface::middleware`].
//!
//! ```rust,ignore
//! use admin_runtime::AdminInterface;
//!
//! let mut admin = AdminInterface::new();
//! admin.register_field_type::<TextField>();
//! admin.set_config_file(env!("CARGO_MANIFEST_DIR"), "admin.yaml")?;
//! let router = admin.middleware::<axum::Router>()?;
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use admin_core::registry::{APP_REPOSITORY, CWD_KEY, FIELD_TYPE_REPOSITORY, INSTANCE_KEY};
use admin_core::{
    AdminContext, BoxError, FieldType, FieldTypeClass, FieldTypeDescriptor, LifecycleBus, Phase,
    PhaseArgs,
};

use crate::config::{AdminConfig, ConfigError, ConfigLoader, DotfileDiscovery, RcDiscovery};
use crate::error::RuntimeResult;
use crate::installation;
use crate::logging;
use crate::plugin::AdminPlugin;

/// The plugin lifecycle orchestrator.
pub struct AdminInterface {
    ctx: AdminContext,
    bus: LifecycleBus,
    loader: ConfigLoader,
    rc: Box<dyn RcDiscovery>,
    use_rc: bool,
    config: Option<AdminConfig>,
}

impl fmt::Debug for AdminInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminInterface")
            .field("use_rc", &self.use_rc)
            .field("bus", &self.bus)
            .field("configured", &self.config.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for AdminInterface {
    fn default() -> Self {
        Self::new()
    }
}

impl AdminInterface {
    /// Creates an orchestrator with the installation subscriber in place.
    pub fn new() -> Self {
        Self::with_context(AdminContext::new())
    }

    /// Creates an orchestrator around an existing context.
    pub fn with_context(ctx: AdminContext) -> Self {
        let mut bus = LifecycleBus::new();
        installation::install(&mut bus);
        Self {
            ctx,
            bus,
            loader: ConfigLoader::new(),
            rc: Box::new(DotfileDiscovery::new()),
            use_rc: true,
            config: None,
        }
    }

    /// Replaces the rc-file discovery.
    pub fn with_rc_discovery(mut self, rc: impl RcDiscovery + 'static) -> Self {
        self.rc = Box::new(rc);
        self
    }

    /// Replaces the loader template used for every configuration file.
    pub fn with_config_loader(mut self, loader: ConfigLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Subscribes a handler to `phase`.
    pub fn subscribe<F>(&mut self, phase: Phase, handler: F) -> &mut Self
    where
        F: FnMut(&mut AdminContext, &PhaseArgs<'_>) -> Result<(), BoxError> + Send + 'static,
    {
        self.bus.subscribe(phase, handler);
        self
    }

    /// Installs every handler of `plugin`.
    pub fn register_plugin(&mut self, plugin: &impl AdminPlugin) -> &mut Self {
        plugin.subscribe(&mut self.bus);
        info!(plugin = plugin.name(), "Plugin registered");
        self
    }

    /// Registers the field type `T` during `start:init-plugin`.
    ///
    /// The descriptor is also stored under `FieldType/<TYPE_KEY>`.
    pub fn register_field_type<T>(&mut self) -> &mut Self
    where
        T: FieldTypeClass + FieldType + Default,
    {
        self.bus.subscribe(Phase::StartInitPlugin, |ctx, _| {
            let descriptor = FieldTypeDescriptor::of::<T>();
            ctx.registry_mut()
                .repository_mut(FIELD_TYPE_REPOSITORY)
                .set(descriptor.type_key, descriptor);
            ctx.field_types_mut().register(descriptor);
            Ok(())
        });
        self
    }

    /// Loads `base_dir/config_file` and publishes it as `set-config`.
    ///
    /// Stores `base_dir` under `App/cwd` and disables rc-file discovery.
    pub fn set_config_file(
        &mut self,
        base_dir: impl AsRef<Path>,
        config_file: impl AsRef<Path>,
    ) -> RuntimeResult<&mut Self> {
        self.apply_config_file(base_dir.as_ref(), config_file.as_ref())?;
        self.use_rc = false;
        Ok(self)
    }

    /// Enables or disables rc-file discovery on the next `start`.
    pub fn set_use_rc(&mut self, use_rc: bool) -> &mut Self {
        self.use_rc = use_rc;
        self
    }

    pub fn use_rc(&self) -> bool {
        self.use_rc
    }

    /// Runs rc discovery (if enabled) and then every start phase in order.
    ///
    /// Each call republishes the phases.
    pub fn start(&mut self) -> RuntimeResult<()> {
        if self.use_rc {
            self.apply_rc_file()?;
        }

        for phase in Phase::START_SEQUENCE {
            self.bus.publish(phase, &mut self.ctx, &PhaseArgs::None)?;
        }

        info!("Admin interface started");
        Ok(())
    }

    /// Starts and returns the handler stored under `App/instance`.
    pub fn middleware<H>(&mut self) -> RuntimeResult<Arc<H>>
    where
        H: Send + Sync + 'static,
    {
        self.start()?;
        let instance = self
            .ctx
            .registry()
            .repository(APP_REPOSITORY)?
            .require::<H>(INSTANCE_KEY)?;
        Ok(instance)
    }

    pub fn context(&self) -> &AdminContext {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut AdminContext {
        &mut self.ctx
    }

    /// The last configuration published as `set-config`.
    pub fn config(&self) -> Option<&AdminConfig> {
        self.config.as_ref()
    }

    fn apply_rc_file(&mut self) -> RuntimeResult<()> {
        match self.rc.discover()? {
            Some(source) => {
                debug!(
                    base_dir = %source.base_dir.display(),
                    config = %source.config_file.display(),
                    "Using configuration from rc file"
                );
                self.apply_config_file(&source.base_dir, &source.config_file)?;
                self.use_rc = false;
            }
            None => warn!("No rc file found, starting without configuration"),
        }
        Ok(())
    }

    fn apply_config_file(&mut self, base_dir: &Path, config_file: &Path) -> RuntimeResult<()> {
        self.ctx
            .registry_mut()
            .repository_mut(APP_REPOSITORY)
            .set(CWD_KEY, PathBuf::from(base_dir));

        let config = self.loader.clone().file(base_dir.join(config_file)).load()?;
        logging::init_from_config(&config.logging);

        let value = config.to_value().map_err(ConfigError::from)?;
        self.config = Some(config);

        info!(
            base_dir = %base_dir.display(),
            path = %config_file.display(),
            "Publishing configuration"
        );
        self.bus
            .publish(Phase::SetConfig, &mut self.ctx, &PhaseArgs::Config(&value))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::Mutex;

    use serde_json::{Map, Value};

    use admin_core::registry::{CONFIG_REPOSITORY, LOCALS_KEY};

    use super::*;
    use crate::config::ConfigResult;
    use crate::config::ConfigSource;
    use crate::error::RuntimeError;

    struct NoRc;

    impl RcDiscovery for NoRc {
        fn discover(&self) -> ConfigResult<Option<ConfigSource>> {
            Ok(None)
        }
    }

    fn interface() -> AdminInterface {
        AdminInterface::new()
            .with_rc_discovery(NoRc)
            .with_config_loader(ConfigLoader::new().without_env())
    }

    #[test]
    fn test_set_config_file_publishes_and_disables_rc() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("admin.yaml"), "locals:\n  siteName: Demo\n").unwrap();

        let mut admin = interface();
        admin.set_config_file(dir.path(), "admin.yaml").unwrap();

        assert!(!admin.use_rc());
        let registry = admin.context().registry();
        let cwd = registry
            .repository(APP_REPOSITORY)
            .unwrap()
            .require::<PathBuf>(CWD_KEY)
            .unwrap();
        assert_eq!(*cwd, dir.path());
        let locals = registry
            .repository(CONFIG_REPOSITORY)
            .unwrap()
            .require::<Map<String, Value>>(LOCALS_KEY)
            .unwrap();
        assert_eq!(locals.get("siteName"), Some(&Value::from("Demo")));
        assert!(admin.config().is_some());
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let mut admin = interface();

        let err = admin.set_config_file(dir.path(), "absent.yaml").unwrap_err();
        assert!(matches!(
            err,
            RuntimeError::Config(ConfigError::FileNotFound(_))
        ));
        assert!(admin.use_rc());
    }

    #[test]
    fn test_start_publishes_phases_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut admin = interface();
        for phase in [
            Phase::StartBefore,
            Phase::Start,
            Phase::StartInitPlugin,
            Phase::StartAfter,
        ] {
            let seen = Arc::clone(&seen);
            admin.subscribe(phase, move |_, _| {
                seen.lock().unwrap().push(phase);
                Ok(())
            });
        }

        admin.start().unwrap();

        assert_eq!(*seen.lock().unwrap(), Phase::START_SEQUENCE.to_vec());
    }

    #[test]
    fn test_middleware_without_instance_fails() {
        let mut admin = interface();
        let err = admin.middleware::<String>().unwrap_err();
        assert!(matches!(err, RuntimeError::Registry(_)));
    }
}
