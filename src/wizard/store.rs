//! In-memory session registry.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use uuid::Uuid;

use crate::observability::metrics;
use crate::wizard::session::WizardSession;

#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<Uuid, WizardSession>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&self) -> WizardSession {
        let session = WizardSession::new();
        self.sessions.insert(session.id, session.clone());
        metrics::record_session_count(self.sessions.len());
        tracing::debug!(session_id = %session.id, "Session created");
        session
    }

    pub fn get(&self, id: &Uuid) -> Option<WizardSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    /// Run `f` against the session under its shard lock.
    ///
    /// Returns `None` for an unknown id. The session counts as active either way.
    pub fn update<T, E>(
        &self,
        id: &Uuid,
        f: impl FnOnce(&mut WizardSession) -> Result<T, E>,
    ) -> Option<Result<T, E>> {
        let mut entry = self.sessions.get_mut(id)?;
        let session = entry.value_mut();
        session.touch();
        Some(f(session))
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let removed = self.sessions.remove(id).is_some();
        metrics::record_session_count(self.sessions.len());
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for at least `ttl`. Returns how many were removed.
    pub fn purge_expired(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, session| session.last_active().elapsed() < ttl);
        let removed = before.saturating_sub(self.sessions.len());
        metrics::record_session_count(self.sessions.len());
        if removed > 0 {
            tracing::info!(removed, remaining = self.sessions.len(), "Expired sessions purged");
        }
        removed
    }
}
