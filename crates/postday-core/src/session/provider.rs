use async_trait::async_trait;

use super::model::Session;
use crate::error::Result;

/// Identity provider the session manager mirrors.
///
/// Credential verification happens entirely on the provider side; the core
/// only asks for the current session and requests sign-out.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolves the session the provider currently holds, if any.
    async fn current_session(&self) -> Result<Option<Session>>;

    /// Terminates the current session.
    ///
    /// # Errors
    ///
    /// Returns `PostdayError::AuthFailure` when the provider rejects the
    /// request. Transport errors may be returned as any other variant; the
    /// session manager normalizes them.
    async fn sign_out(&self) -> Result<()>;
}

/// Provider for local mode, where nobody ever signs in.
#[derive(Debug, Default, Clone, Copy)]
pub struct AnonymousIdentityProvider;

#[async_trait]
impl IdentityProvider for AnonymousIdentityProvider {
    async fn current_session(&self) -> Result<Option<Session>> {
        Ok(None)
    }

    async fn sign_out(&self) -> Result<()> {
        Ok(())
    }
}
