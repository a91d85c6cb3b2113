use postday_core::cache::{CacheBackend, LocalCache, MemoryCacheBackend, POSTS_KEY, StorageFailure};
use postday_core::post::{CacheSeed, CategoryFilter, Post, PostDraft, PostRepository, demo_posts};
use std::sync::{Arc, Mutex};

fn repository_with_backend(seed: CacheSeed) -> (PostRepository, Arc<MemoryCacheBackend>) {
    let backend = Arc::new(MemoryCacheBackend::new());
    let cache = Arc::new(LocalCache::new(backend.clone()));
    (PostRepository::local(cache, seed), backend)
}

#[tokio::test]
async fn test_first_read_seeds_demo_posts_and_persists_them() {
    let (repository, backend) = repository_with_backend(CacheSeed::Demo);

    let first = repository.list(CategoryFilter::all()).await.posts;
    let second = repository.list(CategoryFilter::all()).await.posts;

    assert_eq!(first, demo_posts());
    assert_eq!(first, second);

    let stored: Vec<Post> = serde_json::from_value(backend.stored(POSTS_KEY).unwrap()).unwrap();
    assert_eq!(stored, first);
}

#[tokio::test]
async fn test_empty_seed_persists_empty_sequence() {
    let (repository, backend) = repository_with_backend(CacheSeed::Empty);

    assert!(repository.list(CategoryFilter::all()).await.posts.is_empty());
    assert_eq!(backend.stored(POSTS_KEY), Some(serde_json::json!([])));
}

#[tokio::test]
async fn test_existing_collection_is_not_reseeded() {
    let backend = Arc::new(MemoryCacheBackend::new());
    backend.store(POSTS_KEY, &serde_json::json!([])).unwrap();
    let cache = Arc::new(LocalCache::new(backend));
    let repository = PostRepository::local(cache, CacheSeed::Demo);

    assert!(repository.list(CategoryFilter::all()).await.posts.is_empty());
}

#[tokio::test]
async fn test_created_post_survives_a_new_cache_instance() {
    let backend = Arc::new(MemoryCacheBackend::new());
    let first = PostRepository::local(Arc::new(LocalCache::new(backend.clone())), CacheSeed::Empty);
    let created = first
        .create(
            PostDraft::new("Market day", "Fresh figs everywhere", "4")
                .with_author("Chef Maria")
                .with_image_url("https://example.test/figs.jpg"),
        )
        .await
        .unwrap();

    let second = PostRepository::local(Arc::new(LocalCache::new(backend)), CacheSeed::Demo);
    let posts = second.list(CategoryFilter::all()).await.posts;

    assert_eq!(posts, vec![created.clone()]);
    assert_eq!(created.author, "Chef Maria");
    assert_eq!(created.image_url.as_deref(), Some("https://example.test/figs.jpg"));
}

#[tokio::test]
async fn test_created_ids_are_unique() {
    let (repository, _backend) = repository_with_backend(CacheSeed::Empty);
    let mut ids = Vec::new();
    for n in 0..10 {
        let post = repository
            .create(PostDraft::new(format!("Post {n}"), "body", "1"))
            .await
            .unwrap();
        ids.push(post.id);
    }

    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_create_appears_in_filtered_list() {
    let (repository, _backend) = repository_with_backend(CacheSeed::Demo);
    let post = repository
        .create(PostDraft::new("Office plants", "Our new ficus", "2"))
        .await
        .unwrap();

    let work = repository.list("2").await.posts;
    assert_eq!(work, vec![post]);
}

#[tokio::test]
async fn test_write_failure_keeps_post_visible() {
    let backend = Arc::new(MemoryCacheBackend::new());
    let failures = Arc::new(Mutex::new(Vec::<StorageFailure>::new()));
    let sink = failures.clone();
    let cache = LocalCache::new(backend.clone()).with_failure_hook(Arc::new(
        move |failure: &StorageFailure| sink.lock().unwrap().push(failure.clone()),
    ));
    let repository = PostRepository::local(Arc::new(cache), CacheSeed::Empty);
    repository.list(CategoryFilter::all()).await;

    backend.set_fail_writes(true);
    let post = repository
        .create(PostDraft::new("Offline", "Still here", "1"))
        .await
        .unwrap();

    assert_eq!(repository.list(CategoryFilter::all()).await.posts, vec![post]);
    assert_eq!(failures.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_wrong_shaped_collection_is_reported_without_overwriting() {
    let backend = Arc::new(MemoryCacheBackend::new());
    backend
        .store(POSTS_KEY, &serde_json::json!({"not": "a list"}))
        .unwrap();
    let repository =
        PostRepository::local(Arc::new(LocalCache::new(backend.clone())), CacheSeed::Demo);

    let listing = repository.list(CategoryFilter::all()).await;

    assert!(!listing.is_fresh());
    assert!(listing.posts.is_empty());
    assert_eq!(backend.stored(POSTS_KEY), Some(serde_json::json!({"not": "a list"})));
}

#[tokio::test]
async fn test_snapshot_matches_list_in_local_mode() {
    let (repository, _backend) = repository_with_backend(CacheSeed::Demo);
    assert_eq!(
        repository.snapshot("3"),
        repository.list("3").await.posts
    );
}
