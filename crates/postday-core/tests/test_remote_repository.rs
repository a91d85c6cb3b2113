use async_trait::async_trait;
use postday_core::cache::{LocalCache, MemoryCacheBackend};
use postday_core::error::{PostdayError, Result};
use postday_core::post::{
    CategoryFilter, NewRemotePost, PostDraft, PostRepository, RemoteOptions, RemotePostPatch,
    RemotePostRecord, RemotePostStore, RemoteQuery,
};
use postday_core::session::{AnonymousIdentityProvider, ProviderEvent, Session, SessionManager};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

/// Store double that records every write it receives.
#[derive(Default)]
struct RecordingStore {
    rows: Mutex<Vec<RemotePostRecord>>,
    writes: Mutex<Vec<String>>,
    offline: AtomicBool,
}

impl RecordingStore {
    fn writes(&self) -> Vec<String> {
        self.writes.lock().unwrap().clone()
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PostdayError::remote("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl RemotePostStore for RecordingStore {
    async fn select(&self, query: &RemoteQuery) -> Result<Vec<RemotePostRecord>> {
        self.check_online()?;
        let mut rows: Vec<RemotePostRecord> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| match &query.category_id {
                Some(id) => row.category_id.as_deref() == Some(id.as_str()),
                None => true,
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<RemotePostRecord>> {
        self.check_online()?;
        Ok(self.rows.lock().unwrap().iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, post: NewRemotePost) -> Result<RemotePostRecord> {
        self.check_online()?;
        self.writes.lock().unwrap().push(format!("insert:{}", post.title));
        let mut rows = self.rows.lock().unwrap();
        let record = RemotePostRecord {
            id: (rows.len() + 1).to_string(),
            title: post.title,
            excerpt: post.excerpt,
            category_id: Some(post.category_id),
            author: Some(post.author),
            created_at: format!("2024-03-{:02}T09:00:00", rows.len() + 1),
            image_url: post.image_url,
        };
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: RemotePostPatch) -> Result<u64> {
        self.check_online()?;
        self.writes.lock().unwrap().push(format!("update:{id}"));
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.title = patch.title;
                row.excerpt = patch.excerpt;
                row.category_id = Some(patch.category_id);
                row.image_url = patch.image_url;
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.check_online()?;
        self.writes.lock().unwrap().push(format!("delete:{id}"));
        self.rows.lock().unwrap().retain(|row| row.id != id);
        Ok(())
    }
}

fn remote_repository(store: Arc<RecordingStore>, session: Arc<SessionManager>) -> PostRepository {
    PostRepository::remote(store, session, RemoteOptions::default())
}

fn signed_in(user_id: &str) -> Arc<SessionManager> {
    let session = Arc::new(SessionManager::new(Arc::new(AnonymousIdentityProvider)));
    session.handle_event(ProviderEvent::initial(Some(Session::new(user_id))));
    session
}

#[tokio::test]
async fn test_create_while_signed_out_is_rejected_without_write() {
    let store = Arc::new(RecordingStore::default());
    let session = Arc::new(SessionManager::new(Arc::new(AnonymousIdentityProvider)));
    session.initialize().await;
    let repository = remote_repository(store.clone(), session);

    let err = repository
        .create(PostDraft::new("Hello", "World", "1"))
        .await
        .unwrap_err();

    assert!(err.is_auth_required());
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_create_while_initializing_is_rejected() {
    let store = Arc::new(RecordingStore::default());
    let session = Arc::new(SessionManager::new(Arc::new(AnonymousIdentityProvider)));
    let repository = remote_repository(store.clone(), session);

    let err = repository
        .create(PostDraft::new("Hello", "World", "1"))
        .await
        .unwrap_err();

    assert_eq!(err, PostdayError::AuthRequired);
    assert!(store.writes().is_empty());
}

#[tokio::test]
async fn test_author_comes_from_session_not_draft() {
    let store = Arc::new(RecordingStore::default());
    let repository = remote_repository(store.clone(), signed_in("user-42"));

    let post = repository
        .create(PostDraft::new("Hello", "World", "5").with_author("someone else"))
        .await
        .unwrap();

    assert_eq!(post.author, "user-42");
    assert_eq!(post.date, "3/1/2024");
}

#[tokio::test]
async fn test_created_post_is_in_next_list() {
    let store = Arc::new(RecordingStore::default());
    let repository = remote_repository(store.clone(), signed_in("user-1"));

    repository.create(PostDraft::new("First", "one", "1")).await.unwrap();
    let second = repository.create(PostDraft::new("Second", "two", "1")).await.unwrap();

    let listing = repository.list(CategoryFilter::all()).await;
    assert!(listing.is_fresh());
    assert_eq!(listing.posts[0].id, second.id);
    assert_eq!(listing.posts.iter().filter(|p| p.id == second.id).count(), 1);
}

#[tokio::test]
async fn test_update_and_delete_require_session() {
    let store = Arc::new(RecordingStore::default());
    let writer = remote_repository(store.clone(), signed_in("user-1"));
    let post = writer.create(PostDraft::new("Mine", "body", "2")).await.unwrap();

    let session = Arc::new(SessionManager::new(Arc::new(AnonymousIdentityProvider)));
    session.handle_event(ProviderEvent::initial(None));
    let reader = remote_repository(store.clone(), session);

    assert!(reader.update(post.clone()).await.unwrap_err().is_auth_required());
    assert!(reader.delete(&post.id).await.unwrap_err().is_auth_required());
    assert_eq!(store.writes(), vec!["insert:Mine".to_string()]);
}

#[tokio::test]
async fn test_update_missing_post_is_not_found() {
    let store = Arc::new(RecordingStore::default());
    let repository = remote_repository(store, signed_in("user-1"));
    let ghost = PostDraft::new("t", "e", "1").into_post("404".to_string());

    assert!(repository.update(ghost).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_failed_list_returns_previous_result_for_same_filter() {
    let store = Arc::new(RecordingStore::default());
    let repository = remote_repository(store.clone(), signed_in("user-1"));
    repository.create(PostDraft::new("Travel", "Lisbon", "3")).await.unwrap();
    repository.create(PostDraft::new("Lunch", "Ramen", "4")).await.unwrap();

    let travel = repository.list("3").await;
    store.offline.store(true, Ordering::SeqCst);

    let retry = repository.list("3").await;
    assert!(retry.error.as_ref().is_some_and(PostdayError::is_remote));
    assert_eq!(retry.posts, travel.posts);

    let never_listed = repository.list("4").await;
    assert!(never_listed.posts.is_empty());
    assert!(!never_listed.is_fresh());
}

#[tokio::test]
async fn test_advisory_cache_survives_restart() {
    let store = Arc::new(RecordingStore::default());
    let cache_backend = Arc::new(MemoryCacheBackend::new());
    let options = RemoteOptions {
        advisory_cache: Some(Arc::new(LocalCache::new(cache_backend.clone()))),
        ..RemoteOptions::default()
    };
    let repository = PostRepository::remote(store.clone(), signed_in("user-1"), options);
    repository.create(PostDraft::new("Cached", "body", "1")).await.unwrap();
    let listed = repository.list(CategoryFilter::all()).await.posts;

    let options = RemoteOptions {
        advisory_cache: Some(Arc::new(LocalCache::new(cache_backend))),
        ..RemoteOptions::default()
    };
    let restarted = PostRepository::remote(store, signed_in("user-1"), options);

    assert_eq!(restarted.snapshot(CategoryFilter::all()), listed);
    assert!(restarted.snapshot("2").is_empty());
}
