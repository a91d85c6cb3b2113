//! Key-scoped, write-through local cache.
//!
//! The cache keeps an in-memory copy of every key it has seen and mirrors
//! writes to a [`CacheBackend`]. A failed durable write never invalidates the
//! in-memory value: the failure is reported once through the observability
//! hook and a `tracing` event, and reads keep returning what was written.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use super::backend::CacheBackend;
use crate::error::{PostdayError, Result};

/// Cache key under which the local post collection lives.
pub const POSTS_KEY: &str = "posts";

/// Which backend operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOperation {
    Read,
    Write,
}

/// A durable storage failure reported by the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageFailure {
    pub key: String,
    pub operation: StorageOperation,
    pub message: String,
}

impl fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:?} of cache key '{}' failed: {}",
            self.operation, self.key, self.message
        )
    }
}

/// Observability hook invoked once per storage failure.
pub type StorageFailureHook = Arc<dyn Fn(&StorageFailure) + Send + Sync>;

/// Write-through cache over a durable backend.
pub struct LocalCache {
    backend: Arc<dyn CacheBackend>,
    /// In-memory view. Also serializes writes so values are never torn.
    entries: Mutex<HashMap<String, JsonValue>>,
    on_failure: Option<StorageFailureHook>,
}

impl LocalCache {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend,
            entries: Mutex::new(HashMap::new()),
            on_failure: None,
        }
    }

    /// Installs the hook that receives storage failures.
    pub fn with_failure_hook(mut self, hook: StorageFailureHook) -> Self {
        self.on_failure = Some(hook);
        self
    }

    /// Reads `key`, seeding and persisting `default` on first use.
    ///
    /// After the first call, reading an unseeded key and reading a key that
    /// was explicitly written with `default` are indistinguishable.
    pub fn read(&self, key: &str, default: JsonValue) -> JsonValue {
        let (value, failure) = {
            let mut entries = self.lock_entries();
            if let Some(value) = entries.get(key) {
                return value.clone();
            }

            match self.backend.load(key) {
                Ok(Some(stored)) => {
                    entries.insert(key.to_string(), stored.clone());
                    (stored, None)
                }
                Ok(None) => {
                    tracing::debug!(key, "seeding cache key on first use");
                    entries.insert(key.to_string(), default.clone());
                    let failure = self
                        .backend
                        .store(key, &default)
                        .err()
                        .map(|err| failure(key, StorageOperation::Write, &err));
                    (default, failure)
                }
                Err(err) => {
                    // Keep the unreadable durable bytes; serve the default in memory.
                    entries.insert(key.to_string(), default.clone());
                    (default, Some(failure(key, StorageOperation::Read, &err)))
                }
            }
        };

        if let Some(failure) = failure {
            self.report(&failure);
        }
        value
    }

    /// Typed variant of [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// Returns a serialization error when the stored value does not have the
    /// shape of `T`.
    pub fn read_typed<T>(&self, key: &str, default: &T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = self.read(key, serde_json::to_value(default)?);
        Ok(serde_json::from_value(value)?)
    }

    /// Returns the value for `key` without seeding anything.
    ///
    /// Distinguishes an absent key (`None`) from, e.g., an empty sequence.
    pub fn peek(&self, key: &str) -> Option<JsonValue> {
        let mut entries = self.lock_entries();
        if let Some(value) = entries.get(key) {
            return Some(value.clone());
        }
        match self.backend.load(key) {
            Ok(Some(stored)) => {
                entries.insert(key.to_string(), stored.clone());
                Some(stored)
            }
            Ok(None) => None,
            Err(err) => {
                drop(entries);
                self.report(&failure(key, StorageOperation::Read, &err));
                None
            }
        }
    }

    /// Writes `value` under `key`.
    ///
    /// The new value is visible to subsequent reads even if the durable
    /// write fails.
    pub fn write(&self, key: &str, value: JsonValue) {
        let failure = {
            let mut entries = self.lock_entries();
            let result = self.backend.store(key, &value);
            entries.insert(key.to_string(), value);
            result
                .err()
                .map(|err| failure(key, StorageOperation::Write, &err))
        };

        if let Some(failure) = failure {
            self.report(&failure);
        }
    }

    /// Typed variant of [`write`](Self::write).
    ///
    /// # Errors
    ///
    /// Only fails when `value` cannot be represented as JSON.
    pub fn write_typed<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let value = serde_json::to_value(value)?;
        self.write(key, value);
        Ok(())
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<String, JsonValue>> {
        // A panic while holding the lock cannot leave a torn value behind:
        // entries are replaced whole.
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn report(&self, failure: &StorageFailure) {
        tracing::error!(
            key = %failure.key,
            operation = ?failure.operation,
            error = %failure.message,
            "local cache storage failure"
        );
        if let Some(hook) = &self.on_failure {
            hook(failure);
        }
    }
}

fn failure(key: &str, operation: StorageOperation, err: &PostdayError) -> StorageFailure {
    StorageFailure {
        key: key.to_string(),
        operation,
        message: err.to_string(),
    }
}
