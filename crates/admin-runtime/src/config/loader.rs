//! Configuration loader using figment.
//!
//! # Configuration Priority (lowest to highest)
//!
//! 1. Built-in defaults
//! 2. Programmatic configuration ([`ConfigLoader::merge`])
//! 3. Profile-specific file next to the main file (`admin.{profile}.yaml`)
//! 4. Main configuration file (`admin.yaml`)
//! 5. Environment variables (`ADMIN_*`)
//!
//! # Environment Variable Mapping
//!
//! Environment variables are mapped using the `ADMIN_` prefix with `__` as separator:
//!
//! - `ADMIN_LOGGING__LEVEL=debug` → `logging.level = "debug"`
//! - `ADMIN_LOCALS__SITENAME=Demo` → `locals.sitename = "Demo"`
//!
//! `ADMIN_PROFILE` selects the profile and is not part of the configuration.
//!
//! # Example
//!
//! ```rust,ignore
//! use admin_runtime::config::ConfigLoader;
//!
//! let config = ConfigLoader::new()
//!     .file("./config/admin.yaml")
//!     .profile("production")
//!     .load()?;
//! ```

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use tracing::{debug, info, trace};

use super::error::{ConfigError, ConfigResult};
use super::schema::AdminConfig;

const ENV_PREFIX: &str = "ADMIN_";
const PROFILE_ENV_KEY: &str = "PROFILE";

/// Configuration profile for environment-specific settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Profile {
    /// Development profile (default).
    #[default]
    Development,
    /// Production profile.
    Production,
    /// Custom profile name.
    Custom(String),
}

impl Profile {
    /// Returns the profile name as a string.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
            Self::Custom(name) => name,
        }
    }

    /// Parses a profile name, accepting the `dev`/`prod` short forms.
    pub fn from_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "development" | "dev" => Self::Development,
            other => Self::Custom(other.to_string()),
        }
    }

    /// Reads `ADMIN_PROFILE`, defaulting to Development.
    pub fn from_env() -> Self {
        std::env::var(format!("{ENV_PREFIX}{PROFILE_ENV_KEY}"))
            .map(|p| Self::from_name(&p))
            .unwrap_or_default()
    }
}

impl std::fmt::Display for Profile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Configuration loader with figment-based multi-source support.
#[derive(Clone)]
pub struct ConfigLoader {
    /// Programmatic configuration, merged right after the defaults.
    base: Figment,
    profile: Profile,
    load_env: bool,
    config_file: Option<PathBuf>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Creates a new configuration loader with defaults.
    pub fn new() -> Self {
        Self {
            base: Figment::new(),
            profile: Profile::from_env(),
            load_env: true,
            config_file: None,
        }
    }

    /// Sets the configuration profile.
    pub fn profile(mut self, profile: impl AsRef<str>) -> Self {
        self.profile = Profile::from_name(profile.as_ref());
        self
    }

    /// Sets the configuration file to load.
    pub fn file<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.config_file = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enables loading environment variables (default: true).
    pub fn with_env(mut self) -> Self {
        self.load_env = true;
        self
    }

    /// Disables loading environment variables.
    pub fn without_env(mut self) -> Self {
        self.load_env = false;
        self
    }

    /// Merges configuration programmatically, below files and environment.
    pub fn merge(mut self, config: AdminConfig) -> Self {
        self.base = self.base.merge(Serialized::defaults(config));
        self
    }

    /// Loads and returns the configuration.
    pub fn load(self) -> ConfigResult<AdminConfig> {
        let profile = self.profile.clone();
        let figment = self.build_figment()?;

        let config: AdminConfig = figment.extract().map_err(|e| {
            ConfigError::ParseError(format!("Failed to extract configuration: {e}"))
        })?;

        debug!(
            profile = %profile,
            logging_level = %config.logging.level,
            sections = config.extra.len(),
            "Configuration loaded successfully"
        );

        Ok(config)
    }

    fn build_figment(self) -> ConfigResult<Figment> {
        let mut figment =
            Figment::from(Serialized::defaults(AdminConfig::default())).merge(self.base);

        if let Some(path) = &self.config_file {
            if !path.is_file() {
                return Err(ConfigError::FileNotFound(path.clone()));
            }
            ensure_yaml(path)?;

            if let Some(profile_path) = profile_variant(path, &self.profile)
                && profile_path.is_file()
            {
                debug!(path = %profile_path.display(), "Loading profile-specific config");
                figment = figment.merge(Yaml::file(profile_path));
            }

            info!(path = %path.display(), "Loading configuration file");
            figment = figment.merge(Yaml::file(path));
        }

        if self.load_env {
            trace!("Loading environment variables with ADMIN_ prefix");
            figment = figment.merge(
                Env::prefixed(ENV_PREFIX)
                    .ignore(&[PROFILE_ENV_KEY])
                    .split("__"),
            );
        }

        Ok(figment)
    }
}

fn ensure_yaml(path: &Path) -> ConfigResult<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
    match ext {
        "yaml" | "yml" => Ok(()),
        _ => Err(ConfigError::ParseError(format!(
            "Unsupported configuration file format: .{ext}"
        ))),
    }
}

/// `admin.yaml` + `production` → `admin.production.yaml`.
fn profile_variant(path: &Path, profile: &Profile) -> Option<PathBuf> {
    let stem = path.file_stem()?.to_str()?;
    let ext = path.extension()?.to_str()?;
    Some(path.with_file_name(format!("{stem}.{}.{ext}", profile.as_str())))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use std::fs;

    use serde_json::json;

    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_default_config() {
        let config = ConfigLoader::new().without_env().load().unwrap();

        assert_eq!(config.logging.level.as_str(), "info");
        assert!(config.locals.is_empty());
    }

    #[test]
    fn test_loads_yaml_file_with_pass_through_sections() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("admin.yaml"),
            "logging:\n  level: warn\nlocals:\n  siteName: Demo\nmodels:\n  post:\n    title: Posts\n",
        )
        .unwrap();

        let config = ConfigLoader::new()
            .without_env()
            .file(dir.path().join("admin.yaml"))
            .load()
            .unwrap();

        assert_eq!(config.logging.level, LogLevel::Warn);
        assert_eq!(config.locals.get("siteName"), Some(&json!("Demo")));
        assert_eq!(config.section("models").unwrap()["post"]["title"], json!("Posts"));
    }

    #[test]
    fn test_main_file_overrides_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("admin.production.yaml"),
            "logging:\n  level: error\nlocals:\n  env: production\n",
        )
        .unwrap();
        fs::write(dir.path().join("admin.yaml"), "logging:\n  level: debug\n").unwrap();

        let config = ConfigLoader::new()
            .without_env()
            .profile("prod")
            .file(dir.path().join("admin.yaml"))
            .load()
            .unwrap();

        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.locals.get("env"), Some(&json!("production")));
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigLoader::new()
            .without_env()
            .file(dir.path().join("absent.yaml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn test_unsupported_extension_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("admin.toml"), "").unwrap();
        let err = ConfigLoader::new()
            .without_env()
            .file(dir.path().join("admin.toml"))
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_profile_env_selects_profile_without_leaking_into_config() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("admin.yaml"), "locals:\n  env: base\n").unwrap();
        fs::write(
            dir.path().join("admin.production.yaml"),
            "locals:\n  env: production\n  tier: gold\n",
        )
        .unwrap();

        // SAFETY: This test is the only one setting ADMIN_PROFILE and cleans up immediately after
        unsafe {
            std::env::set_var("ADMIN_PROFILE", "production");
        }
        let profile = Profile::from_env();
        let config = ConfigLoader::new()
            .file(dir.path().join("admin.yaml"))
            .load();
        unsafe {
            std::env::remove_var("ADMIN_PROFILE");
        }

        assert_eq!(profile, Profile::Production);
        let config = config.unwrap();
        assert!(config.section("profile").is_none());
        assert_eq!(config.locals.get("env"), Some(&json!("base")));
        assert_eq!(config.locals.get("tier"), Some(&json!("gold")));
    }

    #[test]
    fn test_profile_from_name() {
        assert_eq!(Profile::from_name("PROD"), Profile::Production);
        assert_eq!(Profile::from_name("dev"), Profile::Development);
        assert_eq!(Profile::from_name("staging").as_str(), "staging");
    }
}
