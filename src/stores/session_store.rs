//! Session store - live playback sessions keyed by client session id

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::config::UserConfig;
use crate::core::PlaybackSession;

/// A session plus the last time a client touched it
struct SessionEntry {
    session: Arc<Mutex<PlaybackSession>>,
    last_seen: Mutex<Instant>,
}

/// In-memory store for playback sessions
pub struct SessionStore {
    sessions: DashMap<String, Arc<SessionEntry>>,
    config: UserConfig,
}

impl SessionStore {
    pub fn new(config: UserConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
        }
    }

    /// Open a new session and return its id
    pub fn create(&self) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        let entry = SessionEntry {
            session: Arc::new(Mutex::new(PlaybackSession::new(&self.config))),
            last_seen: Mutex::new(Instant::now()),
        };
        self.sessions.insert(id.clone(), Arc::new(entry));

        tracing::debug!("Opened playback session {}", id);
        id
    }

    /// Look up a session, marking it as recently used
    pub fn get(&self, id: &str) -> Option<Arc<Mutex<PlaybackSession>>> {
        let entry = self.sessions.get(id).map(|e| Arc::clone(e.value()))?;
        *entry.last_seen.lock() = Instant::now();
        Some(Arc::clone(&entry.session))
    }

    pub fn remove(&self, id: &str) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Drop sessions idle for at least `ttl`. Returns how many were dropped.
    pub fn purge_idle(&self, ttl: Duration) -> usize {
        let before = self.sessions.len();
        self.sessions
            .retain(|_, entry| entry.last_seen.lock().elapsed() < ttl);
        before - self.sessions.len()
    }

    pub fn config(&self) -> &UserConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_get() {
        let store = SessionStore::new(UserConfig::default());
        let id = store.create();

        assert_eq!(store.len(), 1);
        assert!(store.get(&id).is_some());
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_sessions_are_independent() {
        let store = SessionStore::new(UserConfig::default());
        let a = store.create();
        let b = store.create();
        assert_ne!(a, b);

        let session = store.get(&a).unwrap();
        session.lock().restart();
        assert!(store.get(&b).unwrap().lock().snapshot().track.is_none());
    }

    #[test]
    fn test_purge_idle() {
        let store = SessionStore::new(UserConfig::default());
        store.create();
        store.create();

        assert_eq!(store.purge_idle(Duration::from_secs(3600)), 0);
        assert_eq!(store.purge_idle(Duration::ZERO), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_remove() {
        let store = SessionStore::new(UserConfig::default());
        let id = store.create();
        assert!(store.remove(&id));
        assert!(!store.remove(&id));
    }
}
