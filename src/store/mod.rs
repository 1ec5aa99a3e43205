//! Persistent key-value store backends.
//!
//! A store is a string-keyed, string-valued map shared by every context
//! holding a handle to it. Each successful mutation publishes a
//! [`StoreChanged`] notification to all subscribers. The notification does
//! not name the key; subscribers re-derive whatever state they track.

pub mod file;
pub mod format;
pub mod memory;

use crate::GuardpostError;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tokio::sync::broadcast;

pub use file::FileStore;
pub use memory::MemoryStore;

/// Notification that the store was mutated by some context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreChanged;

/// String-keyed, string-valued persistent store with change notifications.
pub trait KeyValueStore: Send + Sync {
    /// Get the value for a key. Returns `None` if the key is absent.
    fn get(&self, key: &str) -> Option<String>;

    /// Set the value for a key.
    fn set(&self, key: &str, value: &str) -> Result<(), GuardpostError>;

    /// Remove a key. Removing an absent key still notifies subscribers.
    fn remove(&self, key: &str) -> Result<(), GuardpostError>;

    /// Subscribe to change notifications.
    ///
    /// Dropping the receiver unsubscribes.
    fn subscribe(&self) -> broadcast::Receiver<StoreChanged>;
}

pub(crate) fn read_lock<T>(lock: &RwLock<T>) -> RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock<T>(lock: &RwLock<T>) -> RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

/// Publish a change. Having no live subscribers is not an error.
pub(crate) fn publish(notify: &broadcast::Sender<StoreChanged>) {
    let _ = notify.send(StoreChanged);
}
