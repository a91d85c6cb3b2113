//! Crash-safe JSON file writes.
//!
//! A write goes to a hidden temp file next to the target, is fsynced, and is
//! renamed over the target while an exclusive `fs2` lock is held on a
//! sibling `.lock` file. Readers never observe a half-written document.

use serde_json::Value as JsonValue;
use std::fs::{self, File, OpenOptions};
use std::io::Write as IoWrite;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AtomicJsonError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Lock error on {path}: {message}")]
    Lock { path: PathBuf, message: String },
}

/// Handle to a single JSON document on disk.
#[derive(Debug, Clone)]
pub struct AtomicJsonFile {
    path: PathBuf,
}

impl AtomicJsonFile {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the document.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(value))`: The file exists and parses
    /// - `Ok(None)`: The file does not exist or is empty
    /// - `Err`: The file could not be read or is not valid JSON
    pub fn load(&self) -> Result<Option<JsonValue>, AtomicJsonError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(self.io_error(err)),
        };

        if content.trim().is_empty() {
            return Ok(None);
        }

        serde_json::from_str(&content)
            .map(Some)
            .map_err(|source| AtomicJsonError::Json {
                path: self.path.clone(),
                source,
            })
    }

    /// Replaces the document with `value`.
    pub fn save(&self, value: &JsonValue) -> Result<(), AtomicJsonError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        let _lock = FileLock::acquire(&self.path)?;

        let json = serde_json::to_string_pretty(value).map_err(|source| AtomicJsonError::Json {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.temp_path();
        let write_tmp = || -> std::io::Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(json.as_bytes())?;
            tmp_file.sync_all()
        };
        if let Err(err) = write_tmp() {
            let _ = fs::remove_file(&tmp_path);
            return Err(self.io_error(err));
        }

        fs::rename(&tmp_path, &self.path).map_err(|err| {
            let _ = fs::remove_file(&tmp_path);
            self.io_error(err)
        })
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entry".to_string());
        self.path.with_file_name(format!(".{}.tmp", file_name))
    }

    fn io_error(&self, source: std::io::Error) -> AtomicJsonError {
        AtomicJsonError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

/// Exclusive lock on `<path>.lock`, released on drop.
struct FileLock {
    _file: File,
}

impl FileLock {
    fn acquire(path: &Path) -> Result<Self, AtomicJsonError> {
        let lock_path = path.with_extension("lock");
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|source| AtomicJsonError::Io {
                path: lock_path.clone(),
                source,
            })?;

        use fs2::FileExt;
        file.lock_exclusive().map_err(|e| AtomicJsonError::Lock {
            path: lock_path,
            message: e.to_string(),
        })?;

        Ok(Self { _file: file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::new(temp_dir.path().join("posts.json"));

        file.save(&json!([{"id": "1"}])).unwrap();
        assert_eq!(file.load().unwrap(), Some(json!([{"id": "1"}])));
    }

    #[test]
    fn test_missing_and_empty_files_load_as_none() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::new(temp_dir.path().join("missing.json"));
        assert_eq!(file.load().unwrap(), None);

        fs::write(file.path(), "  \n").unwrap();
        assert_eq!(file.load().unwrap(), None);
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let file = AtomicJsonFile::new(temp_dir.path().join("broken.json"));
        fs::write(file.path(), "[{\"id\": ").unwrap();

        assert!(matches!(file.load(), Err(AtomicJsonError::Json { .. })));
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("posts.json");
        let file = AtomicJsonFile::new(path.clone());

        file.save(&json!({"a": 1})).unwrap();
        file.save(&json!({"a": 2})).unwrap();

        assert!(path.exists());
        assert!(!temp_dir.path().join("nested").join(".posts.json.tmp").exists());
        assert_eq!(file.load().unwrap(), Some(json!({"a": 2})));
    }
}
