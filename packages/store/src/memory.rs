use std::sync::{Arc, Mutex};

use crate::models::Session;
use crate::SessionStore;

/// In-memory SessionStore for tests and ephemeral sessions.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    session: Arc<Mutex<Option<Session>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    async fn load(&self) -> Option<Session> {
        self.session.lock().unwrap().clone()
    }

    async fn save(&self, session: &Session) {
        *self.session.lock().unwrap() = Some(session.clone());
    }

    async fn clear(&self) {
        *self.session.lock().unwrap() = None;
    }
}
