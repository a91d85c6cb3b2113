//! Remote authoritative store seam and the backend built on it.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use std::sync::Arc;

use super::model::{CategoryFilter, Post, PostDraft};
use super::repository::PostBackend;
use crate::cache::LocalCache;
use crate::error::{PostdayError, Result};
use crate::session::SessionManager;

/// Table holding posts on the remote store.
pub const POSTS_TABLE: &str = "posts";

/// Default rendering of `created_at` (e.g. `2/20/2024`).
pub const DEFAULT_REMOTE_DATE_FORMAT: &str = "%-m/%-d/%Y";

/// A select request: optional `category_id` equality, `created_at` descending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteQuery {
    pub table: String,
    pub category_id: Option<String>,
    pub order_by: String,
    pub descending: bool,
}

impl RemoteQuery {
    pub fn posts(filter: &CategoryFilter) -> Self {
        Self {
            table: POSTS_TABLE.to_string(),
            category_id: filter.category_id().map(str::to_string),
            order_by: "created_at".to_string(),
            descending: true,
        }
    }
}

/// A post row as returned by the remote store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemotePostRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub title: String,
    pub excerpt: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    pub created_at: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl RemotePostRecord {
    /// Maps the row into a [`Post`], rendering `created_at` with `date_format`.
    pub fn into_post(self, date_format: &str) -> Post {
        let date = format_remote_date(&self.created_at, date_format);
        Post {
            id: self.id,
            title: self.title,
            excerpt: self.excerpt,
            category_id: self.category_id.unwrap_or_default(),
            author: self.author.unwrap_or_default(),
            date,
            image_url: Some(self.image_url.unwrap_or_default()),
        }
    }
}

/// Insert payload. `author` always comes from the current session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewRemotePost {
    pub title: String,
    pub excerpt: String,
    pub category_id: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Update payload. The owner and creation time are never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemotePostPatch {
    pub title: String,
    pub excerpt: String,
    pub category_id: String,
    pub image_url: Option<String>,
}

impl From<&Post> for RemotePostPatch {
    fn from(post: &Post) -> Self {
        Self {
            title: post.title.clone(),
            excerpt: post.excerpt.clone(),
            category_id: post.category_id.clone(),
            image_url: post.image_url.clone().filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Remote authoritative store.
///
/// Implementations assign `id` and `created_at` on insert and may enforce
/// row-level ownership policies of their own.
#[async_trait]
pub trait RemotePostStore: Send + Sync {
    /// Runs a select query.
    async fn select(&self, query: &RemoteQuery) -> Result<Vec<RemotePostRecord>>;

    /// Fetches one row by id.
    async fn select_by_id(&self, id: &str) -> Result<Option<RemotePostRecord>>;

    /// Inserts one row and returns it as stored.
    async fn insert(&self, post: NewRemotePost) -> Result<RemotePostRecord>;

    /// Updates one row.
    ///
    /// # Returns
    ///
    /// The number of affected rows; `0` when no row has that id.
    async fn update(&self, id: &str, patch: RemotePostPatch) -> Result<u64>;

    /// Deletes one row. Deleting a missing row succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// Options for [`RemotePostBackend`].
#[derive(Clone)]
pub struct RemoteOptions {
    /// `chrono` format used to render `created_at`.
    pub date_format: String,
    /// Advisory last-known-good cache for instant display.
    pub advisory_cache: Option<Arc<LocalCache>>,
}

impl Default for RemoteOptions {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_REMOTE_DATE_FORMAT.to_string(),
            advisory_cache: None,
        }
    }
}

/// Post backend over a [`RemotePostStore`], gated by the session.
///
/// Every write requires a `Present` session; the check happens before any
/// request reaches the store.
pub struct RemotePostBackend {
    store: Arc<dyn RemotePostStore>,
    session: Arc<SessionManager>,
    options: RemoteOptions,
}

impl RemotePostBackend {
    pub fn new(
        store: Arc<dyn RemotePostStore>,
        session: Arc<SessionManager>,
        options: RemoteOptions,
    ) -> Self {
        Self {
            store,
            session,
            options,
        }
    }

    fn require_user(&self) -> Result<String> {
        self.session
            .current_state()
            .user_id()
            .map(str::to_string)
            .ok_or(PostdayError::AuthRequired)
    }

    fn advisory_key(filter: &CategoryFilter) -> String {
        format!("remote_posts:{}", filter.key())
    }
}

#[async_trait]
impl PostBackend for RemotePostBackend {
    async fn list(&self, filter: &CategoryFilter) -> Result<Vec<Post>> {
        let records = self.store.select(&RemoteQuery::posts(filter)).await?;
        let posts: Vec<Post> = records
            .into_iter()
            .map(|record| record.into_post(&self.options.date_format))
            .collect();

        if let Some(cache) = &self.options.advisory_cache {
            cache.write_typed(&Self::advisory_key(filter), &posts)?;
        }
        Ok(posts)
    }

    fn snapshot(&self, filter: &CategoryFilter) -> Vec<Post> {
        let Some(cache) = &self.options.advisory_cache else {
            return Vec::new();
        };
        cache
            .peek(&Self::advisory_key(filter))
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    async fn get(&self, id: &str) -> Result<Option<Post>> {
        Ok(self
            .store
            .select_by_id(id)
            .await?
            .map(|record| record.into_post(&self.options.date_format)))
    }

    async fn create(&self, draft: PostDraft) -> Result<Post> {
        let author = self.require_user()?;
        let image_url = draft.normalized_image_url();
        let record = self
            .store
            .insert(NewRemotePost {
                title: draft.title,
                excerpt: draft.excerpt,
                category_id: draft.category_id,
                author,
                image_url,
            })
            .await?;

        tracing::debug!(id = %record.id, "created remote post");
        Ok(record.into_post(&self.options.date_format))
    }

    async fn update(&self, post: Post) -> Result<()> {
        self.require_user()?;
        let affected = self.store.update(&post.id, RemotePostPatch::from(&post)).await?;
        if affected == 0 {
            return Err(PostdayError::not_found("post", post.id));
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.require_user()?;
        self.store.delete(id).await
    }
}

/// Renders a remote timestamp as a local calendar date.
///
/// Accepts RFC 3339, zone-less ISO 8601 and bare dates. Anything else is
/// passed through unchanged.
pub fn format_remote_date(created_at: &str, date_format: &str) -> String {
    let raw = created_at.trim();
    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Local).date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(date) => date.format(date_format).to_string(),
        Err(_) => {
            tracing::debug!(created_at = raw, "unparseable created_at, passing through");
            raw.to_string()
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(text) => text,
        Id::Number(number) => number.to_string(),
    })
}
