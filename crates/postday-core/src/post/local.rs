use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::model::{CategoryFilter, Post, PostDraft};
use super::repository::PostBackend;
use super::seed::CacheSeed;
use crate::cache::{LocalCache, POSTS_KEY};
use crate::error::{PostdayError, Result};

/// Post backend whose authoritative collection is the cache's `"posts"` entry.
///
/// The stored sequence order is the list order: new posts are prepended,
/// updates keep their position.
pub struct LocalPostBackend {
    cache: Arc<LocalCache>,
    seed: CacheSeed,
    /// Serializes read-modify-write cycles on the collection.
    write_guard: Mutex<()>,
}

impl LocalPostBackend {
    pub fn new(cache: Arc<LocalCache>, seed: CacheSeed) -> Self {
        Self {
            cache,
            seed,
            write_guard: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<Vec<Post>> {
        self.cache.read_typed(POSTS_KEY, &self.seed.posts())
    }

    fn store(&self, posts: &[Post]) -> Result<()> {
        self.cache.write_typed(POSTS_KEY, &posts)
    }
}

#[async_trait]
impl PostBackend for LocalPostBackend {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Post>> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|post| filter.matches(post))
            .collect())
    }

    fn snapshot(&self, filter: &CategoryFilter) -> Vec<Post> {
        match self.load() {
            Ok(posts) => posts.into_iter().filter(|post| filter.matches(post)).collect(),
            Err(err) => {
                tracing::warn!(error = %err, "local post collection unreadable");
                Vec::new()
            }
        }
    }

    async fn get(&self, id: &str) -> Result<Option<Post>> {
        Ok(self.load()?.into_iter().find(|post| post.id == id))
    }

    async fn create(&self, draft: PostDraft) -> Result<Post> {
        let _guard = self.write_guard.lock().await;
        let mut posts = self.load()?;

        let mut id = Uuid::new_v4().to_string();
        while posts.iter().any(|post| post.id == id) {
            id = Uuid::new_v4().to_string();
        }

        let post = draft.into_post(id);
        posts.insert(0, post.clone());
        self.store(&posts)?;

        tracing::debug!(id = %post.id, "created local post");
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let mut posts = self.load()?;

        let slot = posts
            .iter_mut()
            .find(|existing| existing.id == post.id)
            .ok_or_else(|| PostdayError::not_found("post", post.id.clone()))?;
        *slot = post;

        self.store(&posts)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_guard.lock().await;
        let mut posts = self.load()?;

        let before = posts.len();
        posts.retain(|post| post.id != id);
        if posts.len() == before {
            tracing::debug!(id, "delete of unknown post ignored");
            return Ok(());
        }

        self.store(&posts)
    }
}
