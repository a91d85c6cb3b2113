//! PostgREST-dialect implementation of [`RemotePostStore`].

use async_trait::async_trait;
use postday_core::error::{PostdayError, Result};
use postday_core::post::{
    NewRemotePost, POSTS_TABLE, RemotePostPatch, RemotePostRecord, RemotePostStore, RemoteQuery,
};

use super::client::{RestEndpoint, ensure_success, transport_error};

/// Talks to `{base}/rest/v1/<table>`.
#[derive(Debug, Clone)]
pub struct RestPostStore {
    endpoint: RestEndpoint,
}

impl RestPostStore {
    pub fn new(endpoint: RestEndpoint) -> Self {
        Self { endpoint }
    }

    fn table_url(&self, table: &str) -> String {
        self.endpoint.url(&format!("rest/v1/{}", table))
    }
}

/// Query-string parameters for a select.
pub fn select_params(query: &RemoteQuery) -> Vec<(String, String)> {
    let direction = if query.descending { "desc" } else { "asc" };
    let mut params = vec![
        ("select".to_string(), "*".to_string()),
        ("order".to_string(), format!("{}.{}", query.order_by, direction)),
    ];
    if let Some(category_id) = &query.category_id {
        params.push(("category_id".to_string(), format!("eq.{}", category_id)));
    }
    params
}

fn id_param(id: &str) -> [(&'static str, String); 1] {
    [("id", format!("eq.{}", id))]
}

#[async_trait]
impl RemotePostStore for RestPostStore {
    async fn select(&self, query: &RemoteQuery) -> Result<Vec<RemotePostRecord>> {
        let request = self
            .endpoint
            .client()
            .get(self.table_url(&query.table))
            .query(&select_params(query));
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("select", e))?;

        ensure_success(response, "select")
            .await?
            .json::<Vec<RemotePostRecord>>()
            .await
            .map_err(|e| PostdayError::remote(format!("failed to parse posts: {}", e)))
    }

    async fn select_by_id(&self, id: &str) -> Result<Option<RemotePostRecord>> {
        let request = self
            .endpoint
            .client()
            .get(self.table_url(POSTS_TABLE))
            .query(&[("select", "*")])
            .query(&id_param(id));
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("select", e))?;

        let rows = ensure_success(response, "select")
            .await?
            .json::<Vec<RemotePostRecord>>()
            .await
            .map_err(|e| PostdayError::remote(format!("failed to parse post: {}", e)))?;
        Ok(rows.into_iter().next())
    }

    async fn insert(&self, post: NewRemotePost) -> Result<RemotePostRecord> {
        let request = self
            .endpoint
            .client()
            .post(self.table_url(POSTS_TABLE))
            .header("Prefer", "return=representation")
            .json(&post);
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("insert", e))?;

        let rows = ensure_success(response, "insert")
            .await?
            .json::<Vec<RemotePostRecord>>()
            .await
            .map_err(|e| PostdayError::remote(format!("failed to parse inserted post: {}", e)))?;
        rows.into_iter()
            .next()
            .ok_or_else(|| PostdayError::remote("insert returned no row"))
    }

    async fn update(&self, id: &str, patch: RemotePostPatch) -> Result<u64> {
        let request = self
            .endpoint
            .client()
            .patch(self.table_url(POSTS_TABLE))
            .query(&id_param(id))
            .header("Prefer", "return=representation")
            .json(&patch);
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("update", e))?;

        let rows = ensure_success(response, "update")
            .await?
            .json::<Vec<RemotePostRecord>>()
            .await
            .map_err(|e| PostdayError::remote(format!("failed to parse updated post: {}", e)))?;
        Ok(rows.len() as u64)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let request = self
            .endpoint
            .client()
            .delete(self.table_url(POSTS_TABLE))
            .query(&id_param(id));
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("delete", e))?;

        ensure_success(response, "delete").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postday_core::post::CategoryFilter;

    #[test]
    fn test_select_params_for_all_categories() {
        let params = select_params(&RemoteQuery::posts(&CategoryFilter::all()));
        assert_eq!(
            params,
            vec![
                ("select".to_string(), "*".to_string()),
                ("order".to_string(), "created_at.desc".to_string()),
            ]
        );
    }

    #[test]
    fn test_select_params_with_category() {
        let params = select_params(&RemoteQuery::posts(&CategoryFilter::only("3")));
        assert!(params.contains(&("category_id".to_string(), "eq.3".to_string())));
    }

    #[test]
    fn test_table_url() {
        let store = RestPostStore::new(RestEndpoint::new("https://example.test", "anon"));
        assert_eq!(store.table_url("posts"), "https://example.test/rest/v1/posts");
    }
}
