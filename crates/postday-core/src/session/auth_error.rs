//! Normalization of identity-provider failure messages.
//!
//! The upstream provider only guarantees free-text error messages, so the
//! kind is derived by matching message fragments against
//! [`AUTH_FAILURE_TABLE`]. The table is brittle by nature: a provider release
//! that rewords a message silently degrades that message to
//! [`AuthFailureKind::Unknown`].

use serde::{Deserialize, Serialize};
use std::fmt;

/// Normalized identity-provider failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthFailureKind {
    InvalidCredentials,
    UnverifiedIdentity,
    WeakSecret,
    ProviderDisabled,
    Unknown,
}

/// Message fragment → kind. Matched case-insensitively, first hit wins.
pub const AUTH_FAILURE_TABLE: &[(&str, AuthFailureKind)] = &[
    ("invalid login credentials", AuthFailureKind::InvalidCredentials),
    ("invalid email or password", AuthFailureKind::InvalidCredentials),
    ("email not confirmed", AuthFailureKind::UnverifiedIdentity),
    ("password should be at least", AuthFailureKind::WeakSecret),
    ("weak password", AuthFailureKind::WeakSecret),
    ("signups not allowed", AuthFailureKind::ProviderDisabled),
    ("logins are disabled", AuthFailureKind::ProviderDisabled),
    ("provider is not enabled", AuthFailureKind::ProviderDisabled),
];

impl AuthFailureKind {
    /// Classifies a provider message, falling back to `Unknown`.
    pub fn classify(message: &str) -> Self {
        let message = message.to_lowercase();
        AUTH_FAILURE_TABLE
            .iter()
            .find(|(fragment, _)| message.contains(fragment))
            .map(|(_, kind)| *kind)
            .unwrap_or(AuthFailureKind::Unknown)
    }

    /// Text suitable for showing to the person signing in.
    pub fn user_message(self) -> &'static str {
        match self {
            AuthFailureKind::InvalidCredentials => {
                "Invalid email or password. Please check your credentials and try again."
            }
            AuthFailureKind::UnverifiedIdentity => {
                "Please verify your email address before signing in."
            }
            AuthFailureKind::WeakSecret => "Password should be at least 6 characters long.",
            AuthFailureKind::ProviderDisabled => {
                "This sign-in method is currently disabled. Please try another one."
            }
            AuthFailureKind::Unknown => "Something went wrong. Please try again.",
        }
    }
}

impl fmt::Display for AuthFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AuthFailureKind::InvalidCredentials => "invalid credentials",
            AuthFailureKind::UnverifiedIdentity => "unverified identity",
            AuthFailureKind::WeakSecret => "weak secret",
            AuthFailureKind::ProviderDisabled => "provider disabled",
            AuthFailureKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}
