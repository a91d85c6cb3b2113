//! Remote store and identity provider implementations.
//!
//! - `client`: Shared endpoint settings and error-body handling
//! - `rest_store`: PostgREST-style `RemotePostStore`
//! - `rest_identity`: Auth endpoint `IdentityProvider`
//! - `memory_store`: In-process `RemotePostStore`

mod client;
mod memory_store;
mod rest_identity;
mod rest_store;

pub use client::{RestEndpoint, error_message};
pub use memory_store::InMemoryRemoteStore;
pub use rest_identity::RestIdentityProvider;
pub use rest_store::{RestPostStore, select_params};
