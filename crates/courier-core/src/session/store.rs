//! SessionStore - owns every session's queue/result state.

use super::state::Session;
use std::collections::HashMap;
use std::time::Instant;

/// Addresses a session without exposing how sessions are stored.
///
/// `Default` is the anonymous/device session that always exists and is
/// never reclaimed; `Keyed` sessions are isolated per shared-secret key
/// and created lazily.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionSelector {
    Default,
    Keyed(String),
}

impl SessionSelector {
    pub fn keyed(key: impl Into<String>) -> Self {
        Self::Keyed(key.into())
    }
}

/// Holds the default session plus all keyed sessions.
///
/// The default session lives outside the keyed map, so eviction can
/// never touch it. The store itself is plain data; the broker serializes
/// access behind a single lock.
pub struct SessionStore {
    default: Session,
    keyed: HashMap<String, Session>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            default: Session::new(),
            keyed: HashMap::new(),
        }
    }

    /// Resolve a selector to its session, creating keyed sessions on
    /// first use. Never fails.
    pub fn get_or_create(&mut self, selector: &SessionSelector) -> &mut Session {
        match selector {
            SessionSelector::Default => &mut self.default,
            SessionSelector::Keyed(key) => {
                self.keyed.entry(key.clone()).or_insert_with(Session::new)
            }
        }
    }

    /// Resolve a selector without creating anything.
    pub fn get(&mut self, selector: &SessionSelector) -> Option<&mut Session> {
        match selector {
            SessionSelector::Default => Some(&mut self.default),
            SessionSelector::Keyed(key) => self.keyed.get_mut(key),
        }
    }

    pub fn exists(&self, selector: &SessionSelector) -> bool {
        match selector {
            SessionSelector::Default => true,
            SessionSelector::Keyed(key) => self.keyed.contains_key(key),
        }
    }

    /// Drop a keyed session along with its queue and unclaimed results.
    /// The default session cannot be evicted.
    ///
    /// Waiters parked on the evicted session are woken so they re-park
    /// on whatever session the key resolves to next, instead of
    /// sleeping on a handle nothing will ever notify again.
    pub fn evict(&mut self, key: &str) {
        if let Some(session) = self.keyed.remove(key) {
            session.wake_waiters();
        }
    }

    /// Keys of all keyed sessions with no activity since `cutoff`.
    pub fn idle_keys(&self, cutoff: Instant) -> Vec<String> {
        self.keyed
            .iter()
            .filter(|(_, session)| session.idle_since(cutoff))
            .map(|(key, _)| key.clone())
            .collect()
    }

    pub fn keyed_count(&self) -> usize {
        self.keyed.len()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandSpec};
    use std::time::Duration;

    #[test]
    fn default_session_always_exists() {
        let store = SessionStore::new();
        assert!(store.exists(&SessionSelector::Default));
        assert_eq!(store.keyed_count(), 0);
    }

    #[test]
    fn keyed_sessions_created_lazily() {
        let mut store = SessionStore::new();
        let selector = SessionSelector::keyed("abc");

        assert!(!store.exists(&selector));
        store.get_or_create(&selector);
        assert!(store.exists(&selector));
        assert_eq!(store.keyed_count(), 1);
    }

    #[test]
    fn get_does_not_create() {
        let mut store = SessionStore::new();
        let selector = SessionSelector::keyed("abc");

        assert!(store.get(&selector).is_none());
        assert!(!store.exists(&selector));
    }

    #[test]
    fn sessions_are_isolated() {
        let mut store = SessionStore::new();
        let a = SessionSelector::keyed("a");
        let b = SessionSelector::keyed("b");

        store
            .get_or_create(&a)
            .enqueue(Command::from_spec(CommandSpec::new("for-a")));

        assert!(store.get_or_create(&b).pop_command().is_none());
        assert_eq!(
            store.get_or_create(&a).pop_command().unwrap().body,
            "for-a"
        );
    }

    #[test]
    fn evict_drops_state() {
        let mut store = SessionStore::new();
        let selector = SessionSelector::keyed("abc");
        store
            .get_or_create(&selector)
            .enqueue(Command::from_spec(CommandSpec::new("queued")));

        store.evict("abc");
        assert!(!store.exists(&selector));
        // Re-created fresh, queue is gone.
        assert!(store.get_or_create(&selector).pop_command().is_none());
    }

    #[test]
    fn evict_never_touches_default() {
        let mut store = SessionStore::new();
        store
            .get_or_create(&SessionSelector::Default)
            .enqueue(Command::from_spec(CommandSpec::new("anon")));

        store.evict("default");
        assert_eq!(
            store
                .get_or_create(&SessionSelector::Default)
                .pop_command()
                .unwrap()
                .body,
            "anon"
        );
    }

    #[tokio::test]
    async fn evict_wakes_parked_waiters() {
        let mut store = SessionStore::new();
        let selector = SessionSelector::keyed("abc");
        let notify = store.get_or_create(&selector).notify_handle();

        let notified = notify.notified();
        tokio::pin!(notified);
        notified.as_mut().enable();

        store.evict("abc");

        // Must complete without any result ever being stored.
        tokio::time::timeout(Duration::from_secs(1), notified)
            .await
            .expect("waiter was not woken by eviction");
    }

    #[test]
    fn idle_keys_reports_only_stale_keyed_sessions() {
        let mut store = SessionStore::new();
        store.get_or_create(&SessionSelector::keyed("stale"));

        std::thread::sleep(Duration::from_millis(5));
        let cutoff = Instant::now();
        store.get_or_create(&SessionSelector::keyed("fresh"));

        let idle = store.idle_keys(cutoff);
        assert_eq!(idle, vec!["stale".to_string()]);
    }
}
