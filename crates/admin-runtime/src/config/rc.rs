//! Dotfile discovery of the default configuration file.
//!
//! When the host never calls `set_config_file`, the orchestrator asks an
//! [`RcDiscovery`] collaborator where the configuration lives. The default
//! [`DotfileDiscovery`] looks for `.admininterfacerc` in the working directory
//! and then in the home directory:
//!
//! ```yaml
//! # .admininterfacerc
//! config: config/admin.yaml
//! ```
//!
//! The `config` path is resolved against the directory holding the rc file,
//! and that directory becomes the base directory of the run.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Format, Yaml};
use serde::Deserialize;
use tracing::{debug, trace};

use super::error::{ConfigError, ConfigResult};

/// Default rc file name.
pub const RC_FILE_NAME: &str = ".admininterfacerc";

/// A configuration file located by discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigSource {
    /// Directory the configuration is relative to.
    pub base_dir: PathBuf,
    /// Configuration file, relative to `base_dir` or absolute.
    pub config_file: PathBuf,
}

/// Resolves the configuration source when none was given explicitly.
pub trait RcDiscovery: Send {
    /// Returns the discovered source, or `None` when no rc file exists.
    fn discover(&self) -> ConfigResult<Option<ConfigSource>>;
}

#[derive(Deserialize)]
struct RcContents {
    config: PathBuf,
}

/// Looks for an rc file in a list of directories, first match wins.
#[derive(Debug, Clone)]
pub struct DotfileDiscovery {
    file_name: String,
    search_paths: Vec<PathBuf>,
}

impl Default for DotfileDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

impl DotfileDiscovery {
    /// Searches the current directory, then the home directory.
    pub fn new() -> Self {
        let mut search_paths = Vec::new();
        if let Ok(cwd) = std::env::current_dir() {
            search_paths.push(cwd);
        }
        if let Some(home) = dirs::home_dir() {
            search_paths.push(home);
        }
        Self {
            file_name: RC_FILE_NAME.to_string(),
            search_paths,
        }
    }

    /// Searches only the given directories.
    pub fn with_search_paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        Self {
            file_name: RC_FILE_NAME.to_string(),
            search_paths: paths.into_iter().map(|p| p.as_ref().to_path_buf()).collect(),
        }
    }

    /// Overrides the rc file name.
    pub fn file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = name.into();
        self
    }

    fn read(&self, dir: &Path, path: &Path) -> ConfigResult<ConfigSource> {
        let contents: RcContents = Figment::from(Yaml::file(path))
            .extract()
            .map_err(|e| ConfigError::rc_file(path, e.to_string()))?;

        Ok(ConfigSource {
            base_dir: dir.to_path_buf(),
            config_file: contents.config,
        })
    }
}

impl RcDiscovery for DotfileDiscovery {
    fn discover(&self) -> ConfigResult<Option<ConfigSource>> {
        for dir in &self.search_paths {
            let path = dir.join(&self.file_name);
            trace!(path = %path.display(), "Checking for rc file");
            if path.is_file() {
                let source = self.read(dir, &path)?;
                debug!(
                    rc_file = %path.display(),
                    config = %source.config_file.display(),
                    "Configuration located via rc file"
                );
                return Ok(Some(source));
            }
        }
        Ok(None)
    }
}
