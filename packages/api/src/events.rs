//! # Auth-state broadcast
//!
//! Independently running parts of an application (a nav bar, a dashboard, a
//! background sync task) need to react when the session changes without
//! sharing a parent. [`AuthEvents`] is a small hub over
//! [`tokio::sync::broadcast`]: the client calls [`AuthEvents::notify`] after
//! every session-store mutation, and every live subscriber receives exactly
//! one event per notification. The event names the kind of change but
//! carries no session data — observers re-read the store, which stays the
//! single source of truth. This replaces the timer polling and ad-hoc DOM
//! events the old front-ends used.

use tokio::sync::broadcast;

/// What changed in the session. A pure "something changed, re-check" signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// A login or registration populated the store.
    LoggedIn,
    /// The store was cleared, either explicitly or after a failed refresh.
    LoggedOut,
    /// The access token was replaced after a successful refresh.
    TokenRefreshed,
    /// The cached profile snapshot was overwritten.
    ProfileUpdated,
}

/// Broadcast hub for [`AuthEvent`]s.
#[derive(Clone, Debug)]
pub struct AuthEvents {
    tx: broadcast::Sender<AuthEvent>,
}

impl Default for AuthEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthEvents {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(16);
        Self { tx }
    }

    /// Register an observer. Only events notified after this call are seen.
    pub fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.tx.subscribe()
    }

    /// Notify all current subscribers. Having none is not an error.
    pub(crate) fn notify(&self, event: AuthEvent) {
        let _ = self.tx.send(event);
    }
}
