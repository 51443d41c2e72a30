//! Server state management
//!
//! Everything a request may touch sits behind one lock, so a request runs to
//! completion before the next one starts.

use crate::registry::{ConnectionId, MatchRegistry};
use crate::session::SessionController;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Server-wide shared state
pub struct ServerState {
    lobby: Mutex<SessionController>,
    next_connection: AtomicU64,
}

impl ServerState {
    pub fn new() -> Self {
        Self::with_registry(MatchRegistry::new())
    }

    pub fn with_registry(registry: MatchRegistry) -> Self {
        Self {
            lobby: Mutex::new(SessionController::new(registry)),
            next_connection: AtomicU64::new(1),
        }
    }

    /// Exclusive access to the registry and outbound queues.
    /// Never hold the guard across an `.await`.
    pub fn lobby(&self) -> MutexGuard<'_, SessionController> {
        self.lobby.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn next_connection_id(&self) -> ConnectionId {
        ConnectionId(self.next_connection.fetch_add(1, Ordering::Relaxed))
    }

    pub fn live_matches(&self) -> usize {
        self.lobby().registry().len()
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new()
    }
}
