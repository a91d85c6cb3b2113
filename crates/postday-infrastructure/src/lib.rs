//! Infrastructure for postday: durable cache files, HTTP remote store and
//! identity provider, configuration loading and logging setup.

pub mod config_loader;
pub mod paths;
pub mod remote;
pub mod storage;
pub mod telemetry;
pub mod wiring;

pub use crate::config_loader::ConfigLoader;
pub use crate::paths::PostdayPaths;
pub use crate::remote::{InMemoryRemoteStore, RestEndpoint, RestIdentityProvider, RestPostStore};
pub use crate::storage::JsonFileCacheBackend;
pub use crate::wiring::{
    AppContext, StorageFailureLog, build_context, build_context_with_backend,
};
