use postday_core::cache::{LocalCache, MemoryCacheBackend};
use postday_core::feed::{FeedState, PostFeed};
use postday_core::post::{CategoryFilter, PostDraft, PostRepository, RemoteOptions};
use postday_core::session::{AnonymousIdentityProvider, ProviderEvent, Session, SessionManager};
use postday_infrastructure::InMemoryRemoteStore;
use std::sync::Arc;

fn session() -> Arc<SessionManager> {
    Arc::new(SessionManager::new(Arc::new(AnonymousIdentityProvider)))
}

fn repository(store: Arc<InMemoryRemoteStore>, session: Arc<SessionManager>) -> PostRepository {
    let cache = Arc::new(LocalCache::new(Arc::new(MemoryCacheBackend::new())));
    PostRepository::remote(
        store,
        session,
        RemoteOptions {
            advisory_cache: Some(cache),
            ..RemoteOptions::default()
        },
    )
}

#[tokio::test]
async fn test_signed_out_create_never_reaches_store() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let session = session();
    session.initialize().await;
    let repository = repository(store.clone(), session);

    let err = repository
        .create(PostDraft::new("Hi", "there", "1"))
        .await
        .unwrap_err();

    assert!(err.is_auth_required());
    assert_eq!(store.write_count(), 0);
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_sign_in_unlocks_writes() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let session = session();
    session.initialize().await;
    let repository = repository(store.clone(), session.clone());

    session.handle_event(ProviderEvent::signed_in(Session::new("user-7")));
    let post = repository
        .create(PostDraft::new("Hi", "there", "1"))
        .await
        .unwrap();

    let listing = repository.list(CategoryFilter::all()).await;
    assert_eq!(listing.posts, vec![post.clone()]);
    assert_eq!(post.author, "user-7");
    assert_eq!(store.write_count(), 1);
}

#[tokio::test]
async fn test_newest_first_across_creates() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let session = session();
    session.handle_event(ProviderEvent::initial(Some(Session::new("user-1"))));
    let repository = repository(store, session);

    let mut ids = Vec::new();
    for title in ["one", "two", "three"] {
        ids.push(repository.create(PostDraft::new(title, "x", "1")).await.unwrap().id);
    }

    let listed: Vec<String> = repository
        .list(CategoryFilter::all())
        .await
        .posts
        .into_iter()
        .map(|post| post.id)
        .collect();
    ids.reverse();
    assert_eq!(listed, ids);
}

#[tokio::test]
async fn test_outage_serves_last_good_and_feed_shows_fallback() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let session = session();
    session.handle_event(ProviderEvent::initial(Some(Session::new("user-1"))));
    let repository = repository(store.clone(), session);
    repository.create(PostDraft::new("Kept", "visible", "5")).await.unwrap();

    let mut feed = PostFeed::new();
    let ticket = feed.request("5");
    feed.resolve(&ticket, repository.list("5").await);
    let ready = feed.visible_posts().to_vec();

    store.set_offline(true);
    let ticket = feed.request("5");
    feed.resolve(&ticket, repository.list("5").await);

    assert!(matches!(feed.state(), FeedState::Failed { .. }));
    assert_eq!(feed.visible_posts(), ready.as_slice());
}

#[tokio::test]
async fn test_delete_unknown_id_is_a_no_op() {
    let store = Arc::new(InMemoryRemoteStore::new());
    let session = session();
    session.handle_event(ProviderEvent::initial(Some(Session::new("user-1"))));
    let repository = repository(store, session);

    repository.delete("does-not-exist").await.unwrap();
    repository.delete("does-not-exist").await.unwrap();
    assert!(repository.list(CategoryFilter::all()).await.posts.is_empty());
}
