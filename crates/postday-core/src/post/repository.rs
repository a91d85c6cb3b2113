use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::local::LocalPostBackend;
use super::model::{CategoryFilter, Post, PostDraft};
use super::remote::{RemoteOptions, RemotePostBackend, RemotePostStore};
use super::seed::CacheSeed;
use crate::cache::LocalCache;
use crate::category::Category;
use crate::error::{PostdayError, Result};
use crate::session::SessionManager;

/// Where the authoritative post collection lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryMode {
    #[default]
    Local,
    Remote,
}

/// Storage strategy behind [`PostRepository`].
///
/// One implementation per [`RepositoryMode`], chosen once at construction.
/// Implementations may assume drafts and posts were already validated.
#[async_trait]
pub trait PostBackend: Send + Sync {
    /// Lists the authoritative collection, newest first.
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Post>>;

    /// Last-known-good collection, available without suspending.
    fn snapshot(&self, filter: &CategoryFilter) -> Vec<Post>;

    async fn get(&self, id: &str) -> Result<Option<Post>>;

    /// Stores a new post and returns it with its assigned `id`.
    async fn create(&self, draft: PostDraft) -> Result<Post>;

    /// Replaces the post with the same `id`.
    ///
    /// # Errors
    ///
    /// Returns `PostdayError::NotFound` if no such post exists.
    async fn update(&self, post: Post) -> Result<()>;

    /// Removes a post. Unknown ids are a no-op.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Result of [`PostRepository::list`].
///
/// On failure `posts` holds the previous successful result for the same
/// filter (or nothing) and `error` carries the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostListing {
    pub filter: CategoryFilter,
    pub posts: Vec<Post>,
    pub error: Option<PostdayError>,
}

impl PostListing {
    pub fn is_fresh(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a plain `Result`, dropping any fallback posts.
    pub fn into_result(self) -> Result<Vec<Post>> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.posts),
        }
    }
}

/// Unified CRUD surface over the local cache or the remote store.
pub struct PostRepository {
    mode: RepositoryMode,
    backend: Arc<dyn PostBackend>,
    categories: Vec<Category>,
    /// Last successful listing per filter key.
    last_good: Mutex<HashMap<String, Vec<Post>>>,
}

impl PostRepository {
    /// Creates a repository over an explicit backend.
    ///
    /// # Arguments
    ///
    /// * `mode` - The mode `backend` implements
    /// * `backend` - Storage strategy
    pub fn new(mode: RepositoryMode, backend: Arc<dyn PostBackend>) -> Self {
        Self {
            mode,
            backend,
            categories: Category::defaults(),
            last_good: Mutex::new(HashMap::new()),
        }
    }

    /// Local mode: the cache's `"posts"` entry is authoritative.
    pub fn local(cache: Arc<LocalCache>, seed: CacheSeed) -> Self {
        Self::new(
            RepositoryMode::Local,
            Arc::new(LocalPostBackend::new(cache, seed)),
        )
    }

    /// Remote mode: `store` is authoritative and writes require a session.
    pub fn remote(
        store: Arc<dyn RemotePostStore>,
        session: Arc<SessionManager>,
        options: RemoteOptions,
    ) -> Self {
        Self::new(
            RepositoryMode::Remote,
            Arc::new(RemotePostBackend::new(store, session, options)),
        )
    }

    /// Replaces the default category set.
    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn mode(&self) -> RepositoryMode {
        self.mode
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Lists posts matching `filter`, newest first.
    ///
    /// Never fails outright: a backend failure yields the previous
    /// successful result for this filter together with the error.
    pub async fn list(&self, filter: impl Into<CategoryFilter>) -> PostListing {
        let filter = filter.into();
        match self.backend.list(&filter).await {
            Ok(posts) => {
                self.remember(&filter, &posts);
                PostListing {
                    filter,
                    posts,
                    error: None,
                }
            }
            Err(err) => {
                tracing::warn!(
                    filter = filter.key(),
                    error = %err,
                    "listing posts failed, serving fallback"
                );
                let posts = self.fallback(&filter);
                PostListing {
                    filter,
                    posts,
                    error: Some(err),
                }
            }
        }
    }

    /// Last-known-good posts for instant display.
    pub fn snapshot(&self, filter: impl Into<CategoryFilter>) -> Vec<Post> {
        self.backend.snapshot(&filter.into())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Post>> {
        self.backend.get(id).await
    }

    /// Creates a post from `draft`.
    ///
    /// # Errors
    ///
    /// - `Validation` if `title` or `excerpt` is blank
    /// - `AuthRequired` in remote mode without a present session
    /// - `Remote` if the store rejects the insert
    pub async fn create(&self, draft: PostDraft) -> Result<Post> {
        draft.validate()?;
        let post = self.backend.create(draft).await?;
        tracing::info!(id = %post.id, mode = ?self.mode, "post created");
        Ok(post)
    }

    /// Replaces the post with the same `id`.
    pub async fn update(&self, post: Post) -> Result<()> {
        post.validate()?;
        let id = post.id.clone();
        self.backend.update(post).await?;
        tracing::info!(id = %id, mode = ?self.mode, "post updated");
        Ok(())
    }

    /// Removes a post. Deleting an unknown id succeeds.
    pub async fn delete(&self, id: &str) -> Result<()> {
        self.backend.delete(id).await?;
        tracing::info!(id, mode = ?self.mode, "post deleted");
        Ok(())
    }

    fn remember(&self, filter: &CategoryFilter, posts: &[Post]) {
        if let Ok(mut last_good) = self.last_good.lock() {
            last_good.insert(filter.key().to_string(), posts.to_vec());
        }
    }

    fn fallback(&self, filter: &CategoryFilter) -> Vec<Post> {
        let remembered = self
            .last_good
            .lock()
            .ok()
            .and_then(|last_good| last_good.get(filter.key()).cloned());
        remembered.unwrap_or_else(|| self.backend.snapshot(filter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCacheBackend;

    fn local_repository(seed: CacheSeed) -> PostRepository {
        let cache = Arc::new(LocalCache::new(Arc::new(MemoryCacheBackend::new())));
        PostRepository::local(cache, seed)
    }

    #[tokio::test]
    async fn test_create_rejects_blank_title() {
        let repository = local_repository(CacheSeed::Empty);
        let err = repository
            .create(PostDraft::new("  ", "body", "1"))
            .await
            .unwrap_err();

        assert_eq!(err, PostdayError::validation("title"));
        assert!(repository.list(CategoryFilter::all()).await.posts.is_empty());
    }

    #[tokio::test]
    async fn test_create_then_list_contains_post_once() {
        let repository = local_repository(CacheSeed::Demo);
        let post = repository
            .create(PostDraft::new("Sunrise", "Early hike", "3"))
            .await
            .unwrap();

        let listing = repository.list(CategoryFilter::all()).await;
        assert!(listing.is_fresh());
        assert_eq!(listing.posts.iter().filter(|p| p.id == post.id).count(), 1);
        assert_eq!(listing.posts[0].id, post.id);
    }

    #[tokio::test]
    async fn test_update_unknown_post_is_not_found() {
        let repository = local_repository(CacheSeed::Empty);
        let ghost = PostDraft::new("t", "e", "1").into_post("missing".to_string());

        assert!(repository.update(ghost).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_replaces_in_place() {
        let repository = local_repository(CacheSeed::Demo);
        let mut post = repository.get("3").await.unwrap().unwrap();
        post.title = "Komodo revisited".to_string();

        repository.update(post).await.unwrap();

        let posts = repository.list(CategoryFilter::all()).await.posts;
        assert_eq!(posts[2].id, "3");
        assert_eq!(posts[2].title, "Komodo revisited");
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let repository = local_repository(CacheSeed::Demo);
        repository.delete("2").await.unwrap();
        let once = repository.list(CategoryFilter::all()).await.posts;
        repository.delete("2").await.unwrap();
        let twice = repository.list(CategoryFilter::all()).await.posts;

        assert_eq!(once, twice);
        assert_eq!(once.len(), 4);
    }

    #[tokio::test]
    async fn test_unmatched_category_is_empty() {
        let repository = local_repository(CacheSeed::Demo);
        let listing = repository.list("99").await;
        assert!(listing.is_fresh());
        assert!(listing.posts.is_empty());
    }

    #[test]
    fn test_listing_into_result() {
        let listing = PostListing {
            filter: CategoryFilter::all(),
            posts: Vec::new(),
            error: Some(PostdayError::remote("timeout")),
        };
        assert!(listing.into_result().unwrap_err().is_remote());
    }
}
