use async_trait::async_trait;
use chrono::{Duration, NaiveDateTime, Utc};
use postday_core::error::{PostdayError, Result};
use postday_core::post::{
    NewRemotePost, RemotePostPatch, RemotePostRecord, RemotePostStore, RemoteQuery,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Debug, Default)]
struct Table {
    rows: Vec<RemotePostRecord>,
    next_id: u64,
    /// Last assigned creation time; keeps `created_at` strictly increasing.
    last_created: Option<NaiveDateTime>,
}

/// Process-local [`RemotePostStore`] for demos and tests.
///
/// Behaves like the real store where the core can observe it: ids and
/// `created_at` are assigned on insert, selects are ordered newest first,
/// updates report affected rows.
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    table: Mutex<Table>,
    offline: AtomicBool,
    writes: AtomicUsize,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every call fail with a remote error until reset.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of insert/update/delete calls that reached the store.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.table.lock().map(|table| table.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn table(&self) -> Result<std::sync::MutexGuard<'_, Table>> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(PostdayError::remote("remote store unreachable"));
        }
        self.table
            .lock()
            .map_err(|e| PostdayError::remote(format!("remote table poisoned: {}", e)))
    }

    fn writable_table(&self) -> Result<std::sync::MutexGuard<'_, Table>> {
        let table = self.table()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(table)
    }
}

#[async_trait]
impl RemotePostStore for InMemoryRemoteStore {
    async fn select(&self, query: &RemoteQuery) -> Result<Vec<RemotePostRecord>> {
        let table = self.table()?;
        let mut rows: Vec<RemotePostRecord> = table
            .rows
            .iter()
            .filter(|row| match &query.category_id {
                Some(id) => row.category_id.as_deref() == Some(id.as_str()),
                None => true,
            })
            .cloned()
            .collect();

        // ISO timestamps of one fixed format sort lexically.
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        if query.descending {
            rows.reverse();
        }
        Ok(rows)
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<RemotePostRecord>> {
        let table = self.table()?;
        Ok(table.rows.iter().find(|row| row.id == id).cloned())
    }

    async fn insert(&self, post: NewRemotePost) -> Result<RemotePostRecord> {
        let mut table = self.writable_table()?;

        let now = Utc::now().naive_utc();
        let created = match table.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        table.last_created = Some(created);
        table.next_id += 1;

        let record = RemotePostRecord {
            id: table.next_id.to_string(),
            title: post.title,
            excerpt: post.excerpt,
            category_id: Some(post.category_id),
            author: Some(post.author),
            created_at: created.format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
            image_url: post.image_url,
        };
        table.rows.push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: RemotePostPatch) -> Result<u64> {
        let mut table = self.writable_table()?;
        let Some(row) = table.rows.iter_mut().find(|row| row.id == id) else {
            return Ok(0);
        };
        row.title = patch.title;
        row.excerpt = patch.excerpt;
        row.category_id = Some(patch.category_id);
        row.image_url = patch.image_url;
        Ok(1)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut table = self.writable_table()?;
        table.rows.retain(|row| row.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postday_core::post::CategoryFilter;

    fn new_post(title: &str, category_id: &str) -> NewRemotePost {
        NewRemotePost {
            title: title.to_string(),
            excerpt: "body".to_string(),
            category_id: category_id.to_string(),
            author: "user-1".to_string(),
            image_url: None,
        }
    }

    #[tokio::test]
    async fn test_select_is_newest_first_and_filtered() {
        let store = InMemoryRemoteStore::new();
        store.insert(new_post("a", "1")).await.unwrap();
        store.insert(new_post("b", "2")).await.unwrap();
        store.insert(new_post("c", "1")).await.unwrap();

        let all = store.select(&RemoteQuery::posts(&CategoryFilter::all())).await.unwrap();
        let titles: Vec<&str> = all.iter().map(|row| row.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "b", "a"]);

        let ones = store.select(&RemoteQuery::posts(&CategoryFilter::only("1"))).await.unwrap();
        assert_eq!(ones.len(), 2);
    }

    #[tokio::test]
    async fn test_update_reports_affected_rows() {
        let store = InMemoryRemoteStore::new();
        let row = store.insert(new_post("a", "1")).await.unwrap();
        let patch = RemotePostPatch {
            title: "a2".to_string(),
            excerpt: "body".to_string(),
            category_id: "1".to_string(),
            image_url: None,
        };

        assert_eq!(store.update(&row.id, patch.clone()).await.unwrap(), 1);
        assert_eq!(store.update("missing", patch).await.unwrap(), 0);
        assert_eq!(store.write_count(), 3);
    }

    #[tokio::test]
    async fn test_offline_store_fails_every_call() {
        let store = InMemoryRemoteStore::new();
        store.set_offline(true);

        let err = store
            .select(&RemoteQuery::posts(&CategoryFilter::all()))
            .await
            .unwrap_err();
        assert!(err.is_remote());
        assert!(store.insert(new_post("a", "1")).await.is_err());
        assert_eq!(store.write_count(), 0);
    }
}
