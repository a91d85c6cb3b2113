//! Storage layer for atomic file operations.

mod atomic_json;
mod json_cache_backend;

pub use atomic_json::{AtomicJsonError, AtomicJsonFile};
pub use json_cache_backend::JsonFileCacheBackend;
