//! Local persisted cache.
//!
//! - `backend`: the durable storage seam (`CacheBackend`) and an in-memory
//!   implementation
//! - `local_cache`: the write-through `LocalCache` with first-use seeding

mod backend;
mod local_cache;

pub use backend::{CacheBackend, MemoryCacheBackend};
pub use local_cache::{
    LocalCache, POSTS_KEY, StorageFailure, StorageFailureHook, StorageOperation,
};
