//! Loads [`AppConfig`] from `config.toml` plus `POSTDAY_*` overrides.

use postday_core::config::AppConfig;
use postday_core::error::{PostdayError, Result};
use std::fs;
use std::path::{Path, PathBuf};

use crate::paths::PostdayPaths;

/// Reads the configuration file and applies environment overrides.
///
/// A missing file yields the defaults; a malformed one is an error rather
/// than being silently replaced.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    path: PathBuf,
}

impl ConfigLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loader for the platform location (`~/.config/postday/config.toml`).
    pub fn default_location() -> Result<Self> {
        Ok(Self::new(PostdayPaths::config_file()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the file and applies overrides from the process environment.
    pub fn load(&self) -> Result<AppConfig> {
        self.load_with_env(|name| std::env::var(name).ok())
    }

    /// Loads the file and applies overrides read through `lookup`.
    pub fn load_with_env<F>(&self, lookup: F) -> Result<AppConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = self.load_file()?;
        config.apply_env_overrides(lookup)?;
        Ok(config)
    }

    /// Loads the file alone, without overrides.
    pub fn load_file(&self) -> Result<AppConfig> {
        match fs::read_to_string(&self.path) {
            Ok(content) => {
                tracing::debug!(path = %self.path.display(), "loaded config file");
                AppConfig::from_toml_str(&content)
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no config file, using defaults");
                Ok(AppConfig::default())
            }
            Err(err) => Err(PostdayError::config(format!(
                "failed to read {}: {}",
                self.path.display(),
                err
            ))),
        }
    }

    /// Writes `config` to the file, creating parent directories.
    pub fn save(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                PostdayError::config(format!("failed to create {}: {}", parent.display(), e))
            })?;
        }
        let content = config.to_toml_string()?;
        fs::write(&self.path, content).map_err(|e| {
            PostdayError::config(format!("failed to write {}: {}", self.path.display(), e))
        })
    }
}
