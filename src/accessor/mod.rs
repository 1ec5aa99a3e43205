//! Reactive accessor over a fixed set of persisted keys.
//!
//! A [`StorageAccessor`] owns a [`Snapshot`] of its tracked keys and keeps it
//! in step with the store:
//! - local writes through [`StorageAccessor::set`] update the snapshot at once
//! - change notifications from any context trigger a full [`recompute`],
//!   discarding local state in favor of what the store holds
//!
//! Dropping the accessor drops its subscription.

pub mod snapshot;

use crate::store::{KeyValueStore, StoreChanged};
use crate::GuardpostError;
use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, warn};

pub use snapshot::{recompute, Snapshot, TrackedKeys};

/// Snapshot of a fixed key set, synchronized with a shared store.
pub struct StorageAccessor {
    store: Arc<dyn KeyValueStore>,
    keys: TrackedKeys,
    snapshot: Snapshot,
    changes: broadcast::Receiver<StoreChanged>,
}

impl StorageAccessor {
    /// Mount an accessor for `keys` on `store`.
    ///
    /// Subscribes before reading so no change between the read and the
    /// subscription is lost.
    pub fn new<I, S>(store: Arc<dyn KeyValueStore>, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = TrackedKeys::new(keys);
        let changes = store.subscribe();
        let snapshot = recompute(&keys, store.as_ref());

        Self {
            store,
            keys,
            snapshot,
            changes,
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Current value of `key`; `None` if absent or untracked.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.snapshot.get(key)
    }

    /// Tracked keys.
    pub fn keys(&self) -> &TrackedKeys {
        &self.keys
    }

    /// Store this accessor reads from.
    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    /// Write `value` for `key`, or remove it when `value` is `None`.
    ///
    /// Writes to untracked keys are dropped with a warning. Store failures
    /// are logged and leave the snapshot unchanged.
    pub fn set(&mut self, key: &str, value: Option<&str>) {
        match self.try_set(key, value) {
            Ok(()) => {}
            Err(GuardpostError::UntrackedKey { key }) => {
                warn!(key = %key, "key is not tracked by this accessor, write ignored");
            }
            Err(e) => {
                warn!(key = %key, error = %e, "store write failed");
            }
        }
    }

    /// Like [`set`](Self::set), but reports rejected writes to the caller.
    pub fn try_set(&mut self, key: &str, value: Option<&str>) -> Result<(), GuardpostError> {
        if !self.keys.contains(key) {
            return Err(GuardpostError::UntrackedKey {
                key: key.to_string(),
            });
        }

        match value {
            Some(v) => self.store.set(key, v)?,
            None => self.store.remove(key)?,
        }

        self.snapshot.update(key, value.map(str::to_string));
        Ok(())
    }

    /// Apply pending change notifications without waiting.
    ///
    /// Returns `true` if any notification arrived (or some were missed)
    /// and the snapshot was rebuilt.
    pub fn sync(&mut self) -> bool {
        let mut pending = false;
        loop {
            match self.changes.try_recv() {
                Ok(StoreChanged) | Err(TryRecvError::Lagged(_)) => pending = true,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }

        if pending {
            self.refresh();
        }
        pending
    }

    /// Wait for the next change notification, then rebuild the snapshot.
    ///
    /// Returns `false` if the store can no longer send notifications.
    pub async fn changed(&mut self) -> bool {
        match self.changes.recv().await {
            Ok(StoreChanged) | Err(RecvError::Lagged(_)) => {
                // Fold any burst that queued up behind the first notification.
                if !self.sync() {
                    self.refresh();
                }
                true
            }
            Err(RecvError::Closed) => false,
        }
    }

    /// Rebuild the snapshot from the store unconditionally.
    pub fn refresh(&mut self) {
        self.snapshot = recompute(&self.keys, self.store.as_ref());
        debug!(keys = self.keys.len(), "snapshot recomputed");
    }
}

impl std::fmt::Debug for StorageAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageAccessor")
            .field("keys", &self.keys)
            .field("snapshot", &self.snapshot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn mount(store: &MemoryStore, keys: &[&str]) -> StorageAccessor {
        StorageAccessor::new(Arc::new(store.clone()), keys.iter().copied())
    }

    #[test]
    fn test_initial_snapshot_reads_store() {
        let store = MemoryStore::with_entries([("a", "1")]);
        let accessor = mount(&store, &["a", "b"]);

        assert_eq!(accessor.get("a"), Some("1"));
        assert_eq!(accessor.snapshot().entry("b"), Some(None));
    }

    #[test]
    fn test_set_writes_through_and_updates_snapshot() {
        let store = MemoryStore::new();
        let mut accessor = mount(&store, &["theme"]);

        accessor.set("theme", Some("dark"));

        assert_eq!(accessor.get("theme"), Some("dark"));
        assert_eq!(store.get("theme").as_deref(), Some("dark"));
    }

    #[test]
    fn test_set_empty_string_reads_back_empty() {
        let store = MemoryStore::new();
        let mut accessor = mount(&store, &["register-email"]);

        accessor.set("register-email", Some(""));

        assert_eq!(accessor.snapshot().entry("register-email"), Some(Some("")));
    }

    #[test]
    fn test_set_none_removes() {
        let store = MemoryStore::with_entries([("register-email", "a@b.co")]);
        let mut accessor = mount(&store, &["register-email"]);

        accessor.set("register-email", None);

        assert_eq!(accessor.snapshot().entry("register-email"), Some(None));
        assert_eq!(store.get("register-email"), None);
    }

    #[test]
    fn test_set_untracked_key_is_noop() {
        let store = MemoryStore::with_entries([("a", "1")]);
        let mut accessor = mount(&store, &["a"]);
        let before = accessor.snapshot().clone();

        accessor.set("intruder", Some("x"));
        accessor.set("intruder", None);

        assert_eq!(accessor.snapshot(), &before);
        assert_eq!(store.entries().len(), 1);
        assert_eq!(store.get("intruder"), None);
    }

    #[test]
    fn test_try_set_untracked_key_names_key() {
        let store = MemoryStore::new();
        let mut accessor = mount(&store, &["a"]);

        let result = accessor.try_set("intruder", Some("x"));
        assert!(matches!(result, Err(GuardpostError::UntrackedKey { key }) if key == "intruder"));
    }

    #[test]
    fn test_sync_recomputes_after_external_write() {
        let store = MemoryStore::new();
        let mut accessor = mount(&store, &["a"]);

        store.set("a", "from-elsewhere").unwrap();
        assert_eq!(accessor.get("a"), None);

        assert!(accessor.sync());
        assert_eq!(accessor.get("a"), Some("from-elsewhere"));
        assert!(!accessor.sync());
    }

    #[test]
    fn test_sync_discards_local_state_for_ground_truth() {
        let store = MemoryStore::new();
        let mut ours = mount(&store, &["a"]);
        let mut theirs = mount(&store, &["a"]);

        ours.set("a", Some("mine"));
        theirs.set("a", Some("theirs"));

        assert_eq!(ours.get("a"), Some("mine"));
        ours.sync();
        assert_eq!(ours.get("a"), Some("theirs"));
    }

    #[test]
    fn test_sync_recovers_from_lag() {
        let store = MemoryStore::with_capacity(2);
        let mut accessor = mount(&store, &["n"]);

        for i in 0..10 {
            store.set("n", &i.to_string()).unwrap();
        }

        assert!(accessor.sync());
        assert_eq!(accessor.get("n"), Some("9"));
    }

    #[test]
    fn test_drop_unsubscribes() {
        let store = MemoryStore::new();
        let accessor = mount(&store, &["a"]);
        assert_eq!(store.subscriber_count(), 1);

        drop(accessor);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_changed_waits_for_notification() {
        let store = MemoryStore::new();
        let mut accessor = mount(&store, &["a"]);

        let writer = store.clone();
        tokio::spawn(async move {
            writer.set("a", "async").unwrap();
        });

        assert!(accessor.changed().await);
        assert_eq!(accessor.get("a"), Some("async"));
    }
}
