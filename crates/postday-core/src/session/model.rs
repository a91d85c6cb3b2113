use serde::{Deserialize, Serialize};

/// An authenticated identity as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identifier of the signed-in user.
    pub user_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Locally mirrored session state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// The initial session query has not completed yet.
    #[default]
    Initializing,
    Absent,
    Present { user_id: String },
}

impl SessionState {
    pub fn from_session(session: Option<&Session>) -> Self {
        match session {
            Some(session) => SessionState::Present {
                user_id: session.user_id.clone(),
            },
            None => SessionState::Absent,
        }
    }

    pub fn is_present(&self) -> bool {
        matches!(self, SessionState::Present { .. })
    }

    pub fn user_id(&self) -> Option<&str> {
        match self {
            SessionState::Present { user_id } => Some(user_id),
            _ => None,
        }
    }
}

/// Kind of a provider-reported session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProviderEventKind {
    InitialSession,
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// `(eventKind, session-or-absent)` as delivered by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderEvent {
    pub kind: ProviderEventKind,
    pub session: Option<Session>,
}

impl ProviderEvent {
    pub fn new(kind: ProviderEventKind, session: Option<Session>) -> Self {
        Self { kind, session }
    }

    pub fn initial(session: Option<Session>) -> Self {
        Self::new(ProviderEventKind::InitialSession, session)
    }

    pub fn signed_in(session: Session) -> Self {
        Self::new(ProviderEventKind::SignedIn, Some(session))
    }

    pub fn signed_out() -> Self {
        Self::new(ProviderEventKind::SignedOut, None)
    }

    /// The session this event leaves behind.
    ///
    /// `SignedOut` always clears the session. Any other event without a
    /// session means the provider considers the session expired or invalid.
    pub fn resulting_session(&self) -> Option<&Session> {
        match self.kind {
            ProviderEventKind::SignedOut => None,
            _ => self.session.as_ref(),
        }
    }
}

/// What subscribers are told about a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionChangeKind {
    /// The initial session query resolved.
    Resolved,
    /// Login succeeded.
    SignedIn,
    /// Signed out, or the session expired.
    SignedOut,
}

/// A state transition delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionChange {
    pub kind: SessionChangeKind,
    pub state: SessionState,
}
