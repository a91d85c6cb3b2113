//! Platform paths for postday configuration and cache files.
//!
//! # Directory Structure
//!
//! ```text
//! ~/.config/postday/           # Config directory
//! └── config.toml              # Application configuration
//!
//! ~/.local/share/postday/      # Data directory
//! └── cache/                   # LocalCache entries, one JSON file per key
//!     └── posts.json
//! ```

use postday_core::config::AppConfig;
use postday_core::error::{PostdayError, Result};
use std::path::PathBuf;

const APP_DIR: &str = "postday";

pub struct PostdayPaths;

impl PostdayPaths {
    /// Returns the postday configuration directory.
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: e.g. `~/.config/postday/`
    /// - `Err(PostdayError::Config)`: the platform has no config directory
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| PostdayError::config("cannot determine the config directory"))
    }

    /// Returns the postday data directory, e.g. `~/.local/share/postday/`.
    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or_else(|| PostdayError::config("cannot determine the data directory"))
    }

    /// Returns the path to `config.toml`.
    pub fn config_file() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Returns the cache directory, honouring `storage.cache_dir`.
    pub fn cache_dir(config: &AppConfig) -> Result<PathBuf> {
        match &config.storage.cache_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(Self::data_dir()?.join("cache")),
        }
    }
}
