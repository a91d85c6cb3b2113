//! Post domain module.
//!
//! # Module Structure
//!
//! - `model`: `Post`, `PostDraft`, `CategoryFilter`
//! - `seed`: First-use seed data (`CacheSeed`)
//! - `repository`: `PostRepository` and the `PostBackend` seam
//! - `local`: Backend over the local cache
//! - `remote`: `RemotePostStore` seam, record mapping and the remote backend

mod local;
mod model;
mod remote;
mod repository;
mod seed;

pub use local::LocalPostBackend;
pub use model::{CategoryFilter, LOCAL_DATE_FORMAT, Post, PostDraft, parse_local_date, today};
pub use remote::{
    DEFAULT_REMOTE_DATE_FORMAT, NewRemotePost, POSTS_TABLE, RemoteOptions, RemotePostBackend,
    RemotePostPatch, RemotePostRecord, RemotePostStore, RemoteQuery, format_remote_date,
};
pub use repository::{PostBackend, PostListing, PostRepository, RepositoryMode};
pub use seed::{CacheSeed, demo_posts};
