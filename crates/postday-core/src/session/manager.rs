use std::cell::Cell;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};
use tokio::sync::mpsc;

use super::model::{
    ProviderEvent, ProviderEventKind, Session, SessionChange, SessionChangeKind, SessionState,
};
use super::provider::IdentityProvider;
use crate::error::{PostdayError, Result};

/// Callback invoked for every session transition.
pub type SessionListener = Arc<dyn Fn(&SessionChange) + Send + Sync>;

thread_local! {
    /// Id of the listener currently running on this thread, 0 when none.
    static RUNNING_LISTENER: Cell<u64> = const { Cell::new(0) };
}

/// Shared between a registry entry and its [`Subscription`].
///
/// `call` is held across the `active` check and the callback, so a cancel
/// from another thread waits for an in-flight call to return.
struct ListenerGate {
    active: AtomicBool,
    call: Mutex<()>,
}

impl ListenerGate {
    fn new() -> Self {
        Self {
            active: AtomicBool::new(true),
            call: Mutex::new(()),
        }
    }

    fn invoke(&self, id: u64, callback: &SessionListener, change: &SessionChange) {
        let _call = self.call.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !self.active.load(Ordering::SeqCst) {
            return;
        }
        let previous = RUNNING_LISTENER.with(|running| running.replace(id));
        callback(change);
        RUNNING_LISTENER.with(|running| running.set(previous));
    }

    /// Blocks until no call is in flight, unless the caller is that call.
    fn wait_idle(&self, id: u64) {
        if RUNNING_LISTENER.with(Cell::get) == id {
            return;
        }
        drop(self.call.lock().unwrap_or_else(|poisoned| poisoned.into_inner()));
    }
}

struct ListenerEntry {
    id: u64,
    gate: Arc<ListenerGate>,
    callback: SessionListener,
}

#[derive(Default)]
struct Inner {
    state: SessionState,
    session: Option<Session>,
    listeners: Vec<ListenerEntry>,
    /// Transitions applied but not yet delivered.
    pending: VecDeque<SessionChange>,
    /// Set while some caller is draining `pending`.
    delivering: bool,
}

/// Mirrors the identity provider's session and publishes transitions.
///
/// `SessionManager` is responsible for:
/// - Resolving the initial session exactly once
/// - Applying provider events, coalescing those that do not change state
/// - Delivering transitions to subscribers in the order they were applied
/// - Requesting sign-out from the provider
///
/// Listeners are never invoked while internal locks are held, so a listener
/// may call back into the manager. A transition triggered from inside a
/// listener is queued and delivered after the current one.
pub struct SessionManager {
    inner: Arc<Mutex<Inner>>,
    provider: Arc<dyn IdentityProvider>,
    initialized: AtomicBool,
    next_listener_id: AtomicU64,
}

impl SessionManager {
    /// Creates a manager in the `Initializing` state.
    ///
    /// # Arguments
    ///
    /// * `provider` - The identity provider whose session is mirrored
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner::default())),
            provider,
            initialized: AtomicBool::new(false),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Latest known state. `Initializing` until the first resolution.
    pub fn current_state(&self) -> SessionState {
        self.lock().state.clone()
    }

    /// Latest known session, including provider-side details.
    pub fn current_session(&self) -> Option<Session> {
        self.lock().session.clone()
    }

    /// Runs the initial session query.
    ///
    /// Only the first call queries the provider; later calls return the
    /// current state. A provider failure resolves to `Absent`. If a provider
    /// event already resolved the state, the query result is discarded as
    /// older information.
    pub async fn initialize(&self) -> SessionState {
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.current_state();
        }

        let session = match self.provider.current_session().await {
            Ok(session) => session,
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "initial session query failed, treating as signed out"
                );
                None
            }
        };

        if self.lock().state != SessionState::Initializing {
            tracing::debug!(
                "session resolved by a provider event before the initial query completed"
            );
            return self.current_state();
        }

        self.handle_event(ProviderEvent::initial(session));
        self.current_state()
    }

    /// Registers a listener for every subsequent transition.
    ///
    /// The listener is never told about `Initializing` itself. Delivery stops
    /// as soon as the returned [`Subscription`] is cancelled or dropped.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&SessionChange) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::SeqCst);
        let gate = Arc::new(ListenerGate::new());
        self.lock().listeners.push(ListenerEntry {
            id,
            gate: gate.clone(),
            callback: Arc::new(callback),
        });

        Subscription {
            id,
            gate,
            registry: Arc::downgrade(&self.inner),
        }
    }

    /// Applies a provider event.
    ///
    /// # Returns
    ///
    /// `true` when the event changed the state, `false` when it was coalesced.
    pub fn handle_event(&self, event: ProviderEvent) -> bool {
        let mut inner = self.lock();

        let next = SessionState::from_session(event.resulting_session());
        if next == inner.state {
            // Same user, possibly refreshed details.
            if next.is_present() {
                inner.session = event.resulting_session().cloned();
            }
            tracing::trace!(kind = ?event.kind, "session event coalesced");
            return false;
        }

        if event.kind == ProviderEventKind::UserUpdated && event.session.is_none() {
            tracing::warn!(
                "provider reported a user update without a session; treating as signed out"
            );
        }

        let kind = match (&inner.state, &next) {
            (SessionState::Initializing, _) => SessionChangeKind::Resolved,
            (_, SessionState::Present { .. }) => SessionChangeKind::SignedIn,
            _ => SessionChangeKind::SignedOut,
        };
        tracing::info!(event = ?event.kind, change = ?kind, "session state changed");

        inner.state = next.clone();
        inner.session = event.resulting_session().cloned();
        inner.pending.push_back(SessionChange { kind, state: next });

        if inner.delivering {
            return true;
        }
        inner.delivering = true;
        self.drain(inner);
        true
    }

    /// Requests sign-out from the provider.
    ///
    /// # Errors
    ///
    /// Returns `PostdayError::AuthFailure` if the provider rejects the request.
    /// The state is left unchanged in that case and nothing is retried.
    pub async fn sign_out(&self) -> Result<()> {
        match self.provider.sign_out().await {
            Ok(()) => {
                self.handle_event(ProviderEvent::signed_out());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "sign-out rejected");
                if err.auth_failure_kind().is_some() {
                    Err(err)
                } else {
                    Err(PostdayError::auth_failure(err.to_string()))
                }
            }
        }
    }

    /// Applies provider events until the sender side is closed.
    pub async fn run_event_loop(&self, mut events: mpsc::Receiver<ProviderEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_event(event);
        }
        tracing::debug!("provider event channel closed");
    }

    fn drain<'a>(&'a self, mut inner: MutexGuard<'a, Inner>) {
        loop {
            let Some(change) = inner.pending.pop_front() else {
                inner.delivering = false;
                return;
            };
            let listeners: Vec<(u64, Arc<ListenerGate>, SessionListener)> = inner
                .listeners
                .iter()
                .map(|entry| (entry.id, entry.gate.clone(), entry.callback.clone()))
                .collect();
            drop(inner);

            for (id, gate, callback) in listeners {
                gate.invoke(id, &callback, &change);
            }

            inner = self.lock();
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        lock_inner(&self.inner)
    }
}

fn lock_inner(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Handle returned by [`SessionManager::subscribe`].
///
/// Cancelling (or dropping) the handle guarantees the listener is not
/// invoked again, including for transitions already queued. When the
/// listener is running on another thread, `cancel` returns after that call
/// completes. Cancelling from inside the listener itself does not wait.
pub struct Subscription {
    id: u64,
    gate: Arc<ListenerGate>,
    registry: Weak<Mutex<Inner>>,
}

impl Subscription {
    pub fn cancel(&self) {
        if !self.gate.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Some(inner) = self.registry.upgrade() {
            lock_inner(&inner).listeners.retain(|entry| entry.id != self.id);
        }
        self.gate.wait_idle(self.id);
    }

    pub fn is_active(&self) -> bool {
        self.gate.active.load(Ordering::SeqCst)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::AnonymousIdentityProvider;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(AnonymousIdentityProvider))
    }

    fn recorder(manager: &SessionManager) -> (Subscription, Arc<Mutex<Vec<SessionChange>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let subscription =
            manager.subscribe(move |change| sink.lock().unwrap().push(change.clone()));
        (subscription, seen)
    }

    #[test]
    fn test_starts_initializing() {
        assert_eq!(manager().current_state(), SessionState::Initializing);
    }

    #[test]
    fn test_first_event_resolves() {
        let manager = manager();
        let (_sub, seen) = recorder(&manager);

        manager.handle_event(ProviderEvent::initial(Some(Session::new("u-1"))));

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].kind, SessionChangeKind::Resolved);
        assert_eq!(seen[0].state.user_id(), Some("u-1"));
    }

    #[test]
    fn test_user_updated_without_session_signs_out() {
        let manager = manager();
        manager.handle_event(ProviderEvent::initial(Some(Session::new("u-1"))));
        let (_sub, seen) = recorder(&manager);

        manager.handle_event(ProviderEvent::new(ProviderEventKind::UserUpdated, None));

        assert_eq!(manager.current_state(), SessionState::Absent);
        assert_eq!(seen.lock().unwrap()[0].kind, SessionChangeKind::SignedOut);
    }

    #[test]
    fn test_token_refresh_for_same_user_is_coalesced() {
        let manager = manager();
        manager.handle_event(ProviderEvent::signed_in(Session::new("u-1")));
        let (_sub, seen) = recorder(&manager);

        let changed = manager.handle_event(ProviderEvent::new(
            ProviderEventKind::TokenRefreshed,
            Some(Session::new("u-1").with_email("a@example.com")),
        ));

        assert!(!changed);
        assert!(seen.lock().unwrap().is_empty());
        assert_eq!(
            manager.current_session().and_then(|s| s.email),
            Some("a@example.com".to_string())
        );
    }

    #[test]
    fn test_transition_from_listener_is_queued() {
        let manager = Arc::new(manager());
        manager.handle_event(ProviderEvent::initial(None));

        let order = Arc::new(Mutex::new(Vec::new()));
        let weak = Arc::downgrade(&manager);
        let sink = order.clone();
        let _sub = manager.subscribe(move |change| {
            sink.lock().unwrap().push(change.kind);
            if change.kind == SessionChangeKind::SignedIn {
                if let Some(manager) = weak.upgrade() {
                    manager.handle_event(ProviderEvent::signed_out());
                }
            }
        });

        manager.handle_event(ProviderEvent::signed_in(Session::new("u-1")));

        assert_eq!(
            *order.lock().unwrap(),
            vec![SessionChangeKind::SignedIn, SessionChangeKind::SignedOut]
        );
        assert_eq!(manager.current_state(), SessionState::Absent);
    }

    #[test]
    fn test_dropping_subscription_stops_delivery() {
        let manager = manager();
        let (sub, seen) = recorder(&manager);
        drop(sub);

        manager.handle_event(ProviderEvent::initial(None));
        assert!(seen.lock().unwrap().is_empty());
    }
}
