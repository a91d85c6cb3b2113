use postday_core::cache::CacheBackend;
use postday_core::error::{PostdayError, Result};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

use super::atomic_json::AtomicJsonFile;

/// [`CacheBackend`] storing one JSON file per key under a directory.
///
/// # Directory Structure
///
/// ```text
/// <root>/
/// ├── posts.json
/// ├── posts.lock               # exclusive write lock
/// └── remote_posts%3A3.json    # advisory listing for category 3
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileCacheBackend {
    root: PathBuf,
}

impl JsonFileCacheBackend {
    /// Creates a backend rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing `key`.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", file_stem(key)))
    }

    fn file(&self, key: &str) -> AtomicJsonFile {
        AtomicJsonFile::new(self.path_for(key))
    }
}

impl CacheBackend for JsonFileCacheBackend {
    fn load(&self, key: &str) -> Result<Option<JsonValue>> {
        self.file(key)
            .load()
            .map_err(|e| PostdayError::storage(e.to_string()))
    }

    fn store(&self, key: &str, value: &JsonValue) -> Result<()> {
        self.file(key)
            .save(value)
            .map_err(|e| PostdayError::storage(e.to_string()))
    }
}

/// Maps a namespaced key to a safe file stem.
///
/// ASCII alphanumerics, `-` and `_` are kept; every other byte is
/// percent-encoded, so distinct keys never share a file. The empty key maps
/// to `%`, which no encoded key produces.
fn file_stem(key: &str) -> String {
    if key.is_empty() {
        return "%".to_string();
    }

    let mut stem = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            stem.push(char::from(byte));
        } else {
            stem.push_str(&format!("%{:02X}", byte));
        }
    }
    stem
}
