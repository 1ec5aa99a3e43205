//! Tracked key sets and value snapshots.

use crate::store::KeyValueStore;

/// Ordered set of keys one accessor manages.
///
/// Duplicates collapse onto their first occurrence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackedKeys(Vec<String>);

impl TrackedKeys {
    /// Build a key set from any sequence of keys.
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        keys.into_iter().collect()
    }

    /// Whether `key` is tracked.
    pub fn contains(&self, key: &str) -> bool {
        self.0.iter().any(|k| k == key)
    }

    /// Keys in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no keys are tracked.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for TrackedKeys {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut keys: Vec<String> = Vec::new();
        for key in iter {
            let key = key.into();
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        Self(keys)
    }
}

/// Value of every tracked key at one point in time.
///
/// `None` marks a key absent from the store; it is distinct from `Some("")`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    entries: Vec<(String, Option<String>)>,
}

impl Snapshot {
    /// Value for `key`. `None` if the key is absent or not tracked.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).flatten()
    }

    /// Entry for `key`: `None` if untracked, `Some(None)` if absent.
    pub fn entry(&self, key: &str) -> Option<Option<&str>> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_deref())
    }

    /// Whether `key` is tracked and present in the store.
    pub fn is_present(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Whether `key` is part of this snapshot.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    /// Entries in tracked-key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    /// Number of entries, always the number of tracked keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the snapshot has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the value of an already tracked key.
    pub(crate) fn update(&mut self, key: &str, value: Option<String>) {
        if let Some((_, slot)) = self.entries.iter_mut().find(|(k, _)| k == key) {
            *slot = value;
        }
    }
}

/// Build the snapshot of `keys` from current store contents.
///
/// Pure and idempotent: keys the store holds but `keys` does not name are
/// never included.
pub fn recompute(keys: &TrackedKeys, store: &dyn KeyValueStore) -> Snapshot {
    Snapshot {
        entries: keys
            .iter()
            .map(|key| (key.to_string(), store.get(key)))
            .collect(),
    }
}
