//! Session key → session context.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::session::{RequestParameters, SessionContext};

/// A session behind its per-session lock. Holding the lock is what makes a
/// request the single writer of that session.
pub type SharedSession = Arc<Mutex<SessionContext>>;

/// All live sessions of the process.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SharedSession>>>,
    config: SessionConfig,
}

impl SessionStore {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            config,
        }
    }

    /// Create a session for a first contact.
    pub fn create(&self, initial_parameters: RequestParameters) -> (Uuid, SharedSession) {
        let context = SessionContext::new(&self.config, initial_parameters);
        let id = context.id();
        let session = Arc::new(Mutex::new(context));
        self.sessions.write().insert(id, Arc::clone(&session));
        tracing::info!(session = %id, "Session created");
        (id, session)
    }

    pub fn get(&self, id: &Uuid) -> Option<SharedSession> {
        self.sessions.read().get(id).cloned()
    }

    /// Existing session for `id`, or a new one when `id` is unknown or absent.
    pub fn get_or_create(
        &self,
        id: Option<&Uuid>,
        initial_parameters: RequestParameters,
    ) -> (Uuid, SharedSession) {
        if let Some(id) = id {
            if let Some(session) = self.get(id) {
                return (*id, session);
            }
            tracing::debug!(session = %id, "Unknown session key, creating a new session");
        }
        self.create(initial_parameters)
    }

    /// Remove the session and dispose its application.
    pub fn end(&self, id: &Uuid) -> bool {
        let removed = self.sessions.write().remove(id);
        match removed {
            Some(session) => {
                session.lock().end();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_or_create_reuses_known_sessions() {
        let store = SessionStore::new(SessionConfig::default());
        let (id, _) = store.create(RequestParameters::new());
        let (again, _) = store.get_or_create(Some(&id), RequestParameters::new());
        assert_eq!(id, again);

        let stranger = Uuid::new_v4();
        let (fresh, _) = store.get_or_create(Some(&stranger), RequestParameters::new());
        assert_ne!(fresh, stranger);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn end_removes_session() {
        let store = SessionStore::new(SessionConfig::default());
        let (id, session) = store.create(RequestParameters::new());
        assert!(store.end(&id));
        assert!(!store.end(&id));
        assert!(store.get(&id).is_none());
        assert!(session.lock().application().is_none());
    }
}
