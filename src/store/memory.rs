//! In-memory store, shared by cloning the handle.

use crate::config::GuardpostConfig;
use crate::store::{publish, read_lock, write_lock, KeyValueStore, StoreChanged};
use crate::GuardpostError;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use tokio::sync::broadcast;

#[derive(Debug)]
struct Shared {
    entries: RwLock<BTreeMap<String, String>>,
    notify: broadcast::Sender<StoreChanged>,
}

/// In-memory store. Clones share the same entries and notification channel,
/// the way browser tabs share one origin's storage.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    shared: Arc<Shared>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_capacity(GuardpostConfig::default().notify_capacity)
    }
}

impl MemoryStore {
    /// Create an empty store with the default notification capacity.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store buffering `capacity` notifications per subscriber.
    pub fn with_capacity(capacity: usize) -> Self {
        let (notify, _) = broadcast::channel(capacity.max(1));
        Self {
            shared: Arc::new(Shared {
                entries: RwLock::new(BTreeMap::new()),
                notify,
            }),
        }
    }

    /// Create a store pre-populated with entries. No notification is sent.
    pub fn with_entries<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        write_lock(&store.shared.entries)
            .extend(entries.into_iter().map(|(k, v)| (k.into(), v.into())));
        store
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        read_lock(&self.shared.entries).len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.shared.notify.receiver_count()
    }

    /// Copy of all entries.
    pub fn entries(&self) -> BTreeMap<String, String> {
        read_lock(&self.shared.entries).clone()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        read_lock(&self.shared.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GuardpostError> {
        write_lock(&self.shared.entries).insert(key.to_string(), value.to_string());
        publish(&self.shared.notify);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), GuardpostError> {
        write_lock(&self.shared.entries).remove(key);
        publish(&self.shared.notify);
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
        self.shared.notify.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_set_get_remove() {
        let store = MemoryStore::new();
        assert_eq!(store.get("theme"), None);

        store.set("theme", "dark").unwrap();
        assert_eq!(store.get("theme").as_deref(), Some("dark"));

        store.remove("theme").unwrap();
        assert_eq!(store.get("theme"), None);
        assert!(store.is_empty());
    }

    #[test]
    fn test_memory_store_empty_string_is_present() {
        let store = MemoryStore::new();
        store.set("register-email", "").unwrap();
        assert_eq!(store.get("register-email").as_deref(), Some(""));
    }

    #[test]
    fn test_memory_store_clones_share_entries() {
        let tab_a = MemoryStore::new();
        let tab_b = tab_a.clone();

        tab_a.set("k", "v").unwrap();
        assert_eq!(tab_b.get("k").as_deref(), Some("v"));
    }

    #[test]
    fn test_memory_store_notifies_every_subscriber() {
        let store = MemoryStore::new();
        let mut rx1 = store.subscribe();
        let mut rx2 = store.clone().subscribe();

        store.set("k", "v").unwrap();
        store.remove("missing").unwrap();

        assert_eq!(rx1.try_recv().unwrap(), StoreChanged);
        assert_eq!(rx1.try_recv().unwrap(), StoreChanged);
        assert!(rx1.try_recv().is_err());
        assert_eq!(rx2.try_recv().unwrap(), StoreChanged);
    }

    #[test]
    fn test_memory_store_subscriber_count_tracks_drops() {
        let store = MemoryStore::new();
        let rx = store.subscribe();
        assert_eq!(store.subscriber_count(), 1);
        drop(rx);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_memory_store_with_entries() {
        let store = MemoryStore::with_entries([("a", "x"), ("b", "y")]);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get("b").as_deref(), Some("y"));
    }
}
