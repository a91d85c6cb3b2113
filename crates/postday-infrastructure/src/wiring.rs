//! Assembles the core components for a given configuration.

use postday_core::cache::{CacheBackend, LocalCache, StorageFailure};
use postday_core::config::AppConfig;
use postday_core::error::Result;
use postday_core::post::{PostRepository, RemoteOptions, RepositoryMode};
use postday_core::session::{AnonymousIdentityProvider, SessionManager};
use std::sync::{Arc, Mutex};

use crate::paths::PostdayPaths;
use crate::remote::{RestEndpoint, RestIdentityProvider, RestPostStore};
use crate::storage::JsonFileCacheBackend;

/// Storage failures reported by the cache, kept for the front end to show.
#[derive(Debug, Clone, Default)]
pub struct StorageFailureLog {
    failures: Arc<Mutex<Vec<StorageFailure>>>,
}

impl StorageFailureLog {
    pub fn record(&self, failure: &StorageFailure) {
        self.lock().push(failure.clone());
    }

    /// Returns the failures recorded since the last call.
    pub fn take(&self) -> Vec<StorageFailure> {
        std::mem::take(&mut *self.lock())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<StorageFailure>> {
        self.failures
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Everything a front end needs to drive postday.
pub struct AppContext {
    pub config: AppConfig,
    pub cache: Arc<LocalCache>,
    pub storage_failures: StorageFailureLog,
    pub session: Arc<SessionManager>,
    pub repository: PostRepository,
}

/// Builds the context with the JSON file cache under the configured directory.
pub fn build_context(config: AppConfig) -> Result<AppContext> {
    let cache_dir = PostdayPaths::cache_dir(&config)?;
    tracing::debug!(dir = %cache_dir.display(), "using cache directory");
    build_context_with_backend(config, Arc::new(JsonFileCacheBackend::new(cache_dir)))
}

/// Builds the context over an explicit cache backend.
///
/// # Errors
///
/// Returns a config error when the configuration is invalid for its mode.
pub fn build_context_with_backend(
    config: AppConfig,
    backend: Arc<dyn CacheBackend>,
) -> Result<AppContext> {
    config.validate()?;
    let storage_failures = StorageFailureLog::default();
    let sink = storage_failures.clone();
    let cache = Arc::new(
        LocalCache::new(backend)
            .with_failure_hook(Arc::new(move |failure: &StorageFailure| sink.record(failure))),
    );

    let (session, repository) = match config.mode {
        RepositoryMode::Local => {
            let session = Arc::new(SessionManager::new(Arc::new(AnonymousIdentityProvider)));
            let repository = PostRepository::local(cache.clone(), config.storage.seed);
            (session, repository)
        }
        RepositoryMode::Remote => {
            let endpoint = RestEndpoint::from_config(&config.remote)?;
            let session = Arc::new(SessionManager::new(Arc::new(RestIdentityProvider::new(
                endpoint.clone(),
            ))));
            let options = RemoteOptions {
                date_format: config.remote.date_format.clone(),
                advisory_cache: config.remote.advisory_cache.then(|| cache.clone()),
            };
            let repository = PostRepository::remote(
                Arc::new(RestPostStore::new(endpoint)),
                session.clone(),
                options,
            );
            (session, repository)
        }
    };

    tracing::info!(mode = ?config.mode, "postday context ready");
    Ok(AppContext {
        config,
        cache,
        storage_failures,
        session,
        repository,
    })
}
