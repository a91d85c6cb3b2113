//! Application configuration model.
//!
//! Loading from disk lives in the infrastructure crate; this module only
//! defines the shape, defaults, environment overrides and validation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{PostdayError, Result};
use crate::post::{CacheSeed, DEFAULT_REMOTE_DATE_FORMAT, RepositoryMode};

pub const ENV_MODE: &str = "POSTDAY_MODE";
pub const ENV_REMOTE_URL: &str = "POSTDAY_REMOTE_URL";
pub const ENV_API_KEY: &str = "POSTDAY_API_KEY";
pub const ENV_ACCESS_TOKEN: &str = "POSTDAY_ACCESS_TOKEN";
pub const ENV_LOG: &str = "POSTDAY_LOG";

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    pub mode: RepositoryMode,
    pub storage: StorageConfig,
    pub remote: RemoteConfig,
    pub logging: LoggingConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Seed for the `"posts"` entry on first use.
    pub seed: CacheSeed,
    /// Overrides the platform data directory for cache files.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RemoteConfig {
    /// Base URL of the remote project, e.g. `https://xyz.example.co`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Public API key sent as the `apikey` header.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// User access token; the API key is used as bearer when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// `chrono` format for rendering `created_at`.
    pub date_format: String,
    pub timeout_secs: u64,
    /// Keep last-known-good listings in the local cache.
    pub advisory_cache: bool,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            access_token: None,
            date_format: DEFAULT_REMOTE_DATE_FORMAT.to_string(),
            timeout_secs: 30,
            advisory_cache: true,
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `postday_core=debug`.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Parses a TOML document. Missing sections take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| PostdayError::Serialization {
            format: "TOML".to_string(),
            message: e.to_string(),
        })
    }

    /// Applies `POSTDAY_*` overrides read through `lookup`.
    ///
    /// Blank values are ignored.
    ///
    /// # Errors
    ///
    /// Returns a config error for an unrecognized `POSTDAY_MODE`.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(mode) = get(ENV_MODE) {
            self.mode = parse_mode(&mode)?;
        }
        if let Some(url) = get(ENV_REMOTE_URL) {
            self.remote.url = Some(url);
        }
        if let Some(key) = get(ENV_API_KEY) {
            self.remote.api_key = Some(key);
        }
        if let Some(token) = get(ENV_ACCESS_TOKEN) {
            self.remote.access_token = Some(token);
        }
        if let Some(level) = get(ENV_LOG) {
            self.logging.level = level;
        }
        Ok(())
    }

    /// Checks that the selected mode has what it needs.
    pub fn validate(&self) -> Result<()> {
        if self.mode == RepositoryMode::Remote {
            let url = self.remote.url.as_deref().unwrap_or("").trim();
            if url.is_empty() {
                return Err(PostdayError::config(format!(
                    "remote mode requires remote.url (or {ENV_REMOTE_URL})"
                )));
            }
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(PostdayError::config(format!(
                    "remote.url must be an http(s) URL, got '{url}'"
                )));
            }
            if self.remote.api_key.as_deref().unwrap_or("").trim().is_empty() {
                return Err(PostdayError::config(format!(
                    "remote mode requires remote.api_key (or {ENV_API_KEY})"
                )));
            }
        }
        if self.remote.timeout_secs == 0 {
            return Err(PostdayError::config("remote.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// Parses `local` / `remote`, case-insensitively.
pub fn parse_mode(value: &str) -> Result<RepositoryMode> {
    match value.trim().to_lowercase().as_str() {
        "local" => Ok(RepositoryMode::Local),
        "remote" => Ok(RepositoryMode::Remote),
        other => Err(PostdayError::config(format!(
            "unknown mode '{other}', expected 'local' or 'remote'"
        ))),
    }
}
