use postday_core::config::RemoteConfig;
use postday_core::error::{PostdayError, Result};
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use std::time::Duration;

/// Connection settings shared by the REST store and the identity provider.
#[derive(Debug, Clone)]
pub struct RestEndpoint {
    client: Client,
    base_url: String,
    api_key: String,
    access_token: Option<String>,
    timeout: Duration,
}

impl RestEndpoint {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            access_token: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Builds an endpoint from the `[remote]` configuration section.
    ///
    /// # Errors
    ///
    /// Returns a config error when the URL or API key is missing.
    pub fn from_config(config: &RemoteConfig) -> Result<Self> {
        let url = config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .ok_or_else(|| PostdayError::config("remote.url is not set"))?;
        let api_key = config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| PostdayError::config("remote.api_key is not set"))?;

        let mut endpoint =
            Self::new(url, api_key).with_timeout(Duration::from_secs(config.timeout_secs));
        if let Some(token) = config.access_token.as_deref().filter(|t| !t.trim().is_empty()) {
            endpoint = endpoint.with_access_token(token);
        }
        Ok(endpoint)
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Attaches `apikey`, bearer authorization and the timeout.
    pub fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let bearer = self.access_token.as_deref().unwrap_or(&self.api_key);
        request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", bearer))
            .timeout(self.timeout)
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

/// Error body shapes returned by the REST and auth endpoints.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Extracts the human-readable message from an error response body.
///
/// Falls back to the raw body when it is not a recognized JSON shape.
pub fn error_message(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| {
            parsed
                .msg
                .or(parsed.error_description)
                .or(parsed.message)
                .or(parsed.error)
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Turns a non-success response into a remote error.
pub async fn ensure_success(response: Response, operation: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(PostdayError::remote(format!(
        "{} failed ({}): {}",
        operation,
        status,
        error_message(&body)
    )))
}

pub fn transport_error(operation: &str, err: reqwest::Error) -> PostdayError {
    PostdayError::remote(format!("{} request failed: {}", operation, err))
}
