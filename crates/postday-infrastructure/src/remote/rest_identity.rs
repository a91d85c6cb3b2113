use async_trait::async_trait;
use postday_core::error::{PostdayError, Result};
use postday_core::session::{IdentityProvider, Session};
use reqwest::StatusCode;
use serde::Deserialize;

use super::client::{RestEndpoint, ensure_success, error_message, transport_error};

/// Identity provider backed by `{base}/auth/v1`.
///
/// The session is whatever the configured access token resolves to. Without
/// a token nobody is signed in.
#[derive(Debug, Clone)]
pub struct RestIdentityProvider {
    endpoint: RestEndpoint,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

impl RestIdentityProvider {
    pub fn new(endpoint: RestEndpoint) -> Self {
        Self { endpoint }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        if self.endpoint.access_token().is_none() {
            return Ok(None);
        }

        let request = self.endpoint.client().get(self.endpoint.url("auth/v1/user"));
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("session lookup", e))?;

        if matches!(response.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            tracing::info!("access token rejected, no session");
            return Ok(None);
        }

        let user = ensure_success(response, "session lookup")
            .await?
            .json::<UserResponse>()
            .await
            .map_err(|e| PostdayError::remote(format!("failed to parse user: {}", e)))?;

        let session = Session::new(user.id);
        Ok(Some(match user.email {
            Some(email) => session.with_email(email),
            None => session,
        }))
    }

    async fn sign_out(&self) -> Result<()> {
        if self.endpoint.access_token().is_none() {
            return Ok(());
        }

        let request = self.endpoint.client().post(self.endpoint.url("auth/v1/logout"));
        let response = self
            .endpoint
            .authorize(request)
            .send()
            .await
            .map_err(|e| transport_error("sign-out", e))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(PostdayError::auth_failure(error_message(&body)))
    }
}
