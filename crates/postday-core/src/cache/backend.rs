//! Durable storage seam behind [`LocalCache`](super::LocalCache).

use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{PostdayError, Result};

/// Durable key/value storage used by the local cache.
///
/// Implementations only move bytes; they never interpret the stored value.
/// Calls are synchronous because cache reads must be.
pub trait CacheBackend: Send + Sync {
    /// Loads the value stored under `key`.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: An entry exists
    /// - `Ok(None)`: No entry has ever been written for `key`
    /// - `Err(_)`: The entry exists but could not be read
    fn load(&self, key: &str) -> Result<Option<JsonValue>>;

    /// Persists `value` under `key`, replacing any previous entry.
    fn store(&self, key: &str, value: &JsonValue) -> Result<()>;
}

/// Process-local backend. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryCacheBackend {
    entries: Mutex<HashMap<String, JsonValue>>,
    fail_writes: AtomicBool,
}

impl MemoryCacheBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `store` fail, to exercise failure reporting.
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns what was last persisted under `key`.
    pub fn stored(&self, key: &str) -> Option<JsonValue> {
        self.entries
            .lock()
            .ok()
            .and_then(|entries| entries.get(key).cloned())
    }
}

impl CacheBackend for MemoryCacheBackend {
    fn load(&self, key: &str) -> Result<Option<JsonValue>> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| PostdayError::storage(format!("memory backend poisoned: {}", e)))?;
        Ok(entries.get(key).cloned())
    }

    fn store(&self, key: &str, value: &JsonValue) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(PostdayError::storage(format!(
                "write to '{}' rejected by memory backend",
                key
            )));
        }
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PostdayError::storage(format!("memory backend poisoned: {}", e)))?;
        entries.insert(key.to_string(), value.clone());
        Ok(())
    }
}
