//! Error types for the postday core.

use thiserror::Error;

use crate::session::AuthFailureKind;

/// A shared error type for repository, cache and session operations.
///
/// Every failure is returned as an explicit outcome; no variant implies that
/// the post collection or the session state was partially updated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PostdayError {
    /// A required field was missing or blank.
    #[error("Validation error: `{field}` is required")]
    Validation { field: &'static str },

    /// A write was attempted without a present session.
    #[error("Authentication required: sign in to continue")]
    AuthRequired,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// The identity provider rejected an operation.
    #[error("Authentication failed ({kind}): {message}")]
    AuthFailure {
        kind: AuthFailureKind,
        message: String,
    },

    /// Local durable storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Network or query error talking to the remote store.
    #[error("Remote store error: {0}")]
    Remote(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl PostdayError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a Validation error for a required field
    pub fn validation(field: &'static str) -> Self {
        Self::Validation { field }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an AuthFailure error by classifying a provider message.
    pub fn auth_failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::AuthFailure {
            kind: AuthFailureKind::classify(&message),
            message,
        }
    }

    /// Creates a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Creates a Remote error
    pub fn remote(message: impl Into<String>) -> Self {
        Self::Remote(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    pub fn is_auth_required(&self) -> bool {
        matches!(self, Self::AuthRequired)
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_remote(&self) -> bool {
        matches!(self, Self::Remote(_))
    }

    /// Returns the normalized kind for authentication failures.
    pub fn auth_failure_kind(&self) -> Option<AuthFailureKind> {
        match self {
            Self::AuthFailure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for PostdayError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for PostdayError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, PostdayError>`.
pub type Result<T> = std::result::Result<T, PostdayError>;
