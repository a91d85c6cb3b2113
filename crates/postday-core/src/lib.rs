//! Core domain for postday: posts, categories, the local cache, the
//! authentication session and the filter pipeline.

pub mod cache;
pub mod category;
pub mod config;
pub mod error;
pub mod feed;
pub mod filter;
pub mod post;
pub mod session;

// Re-export common types
pub use cache::{CacheBackend, LocalCache, MemoryCacheBackend};
pub use category::Category;
pub use config::AppConfig;
pub use error::{PostdayError, Result};
pub use feed::{FeedState, FeedTicket, PostFeed};
pub use filter::PostFilter;
pub use post::{
    CacheSeed, CategoryFilter, Post, PostDraft, PostListing, PostRepository, RepositoryMode,
};
pub use session::{AuthFailureKind, SessionManager, SessionState};
