//! Authentication session domain module.
//!
//! # Module Structure
//!
//! - `model`: Session, mirrored state, provider events and change notices
//! - `auth_error`: Provider message classification (`AuthFailureKind`)
//! - `provider`: The `IdentityProvider` seam
//! - `manager`: State tracking and publish/subscribe (`SessionManager`)

mod auth_error;
mod manager;
mod model;
mod provider;

pub use auth_error::{AUTH_FAILURE_TABLE, AuthFailureKind};
pub use manager::{SessionListener, SessionManager, Subscription};
pub use model::{
    ProviderEvent, ProviderEventKind, Session, SessionChange, SessionChangeKind, SessionState,
};
pub use provider::{AnonymousIdentityProvider, IdentityProvider};
