//! File-backed store with atomic writes.
//!
//! Stores the record under `dirs::data_dir()/<namespace>/<file_name>`.
//! Every mutation re-reads the record, applies the change and rewrites it
//! via temp file + rename, so a concurrent reader sees either the old or
//! the new contents and unrelated keys written elsewhere survive.
//!
//! Another process writing the same file is not observed automatically;
//! call [`FileStore::reload`] to pick up its changes.

use crate::config::GuardpostConfig;
use crate::store::format::StoreRecord;
use crate::store::{publish, read_lock, write_lock, KeyValueStore, StoreChanged};
use crate::GuardpostError;
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;
use tokio::sync::broadcast;
use tracing::debug;

/// File-backed store.
pub struct FileStore {
    /// Path of the store record.
    path: PathBuf,
    /// Entries as last written or loaded.
    entries: RwLock<BTreeMap<String, String>>,
    notify: broadcast::Sender<StoreChanged>,
}

impl FileStore {
    /// Open the store described by `config`.
    ///
    /// The record lives under `dirs::data_dir()/<namespace>/<file_name>`.
    pub fn new(config: &GuardpostConfig) -> Result<Self, GuardpostError> {
        config.validate()?;

        let base_dir = dirs::data_dir()
            .ok_or_else(|| GuardpostError::StoreIO("Could not find data directory".to_string()))?;

        Self::open(
            base_dir.join(config.namespace).join(config.file_name),
            config.notify_capacity,
        )
    }

    /// Open a store at a specific path.
    pub fn with_path(path: impl Into<PathBuf>) -> Result<Self, GuardpostError> {
        Self::open(path.into(), GuardpostConfig::default().notify_capacity)
    }

    fn open(path: PathBuf, capacity: usize) -> Result<Self, GuardpostError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                GuardpostError::StoreIO(format!("Failed to create store dir: {}", e))
            })?;
        }

        let entries = load_entries(&path)?;
        let (notify, _) = broadcast::channel(capacity.max(1));

        Ok(Self {
            path,
            entries: RwLock::new(entries),
            notify,
        })
    }

    /// Path of the store record.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Re-read the record from disk.
    ///
    /// Returns `true` and notifies subscribers if the contents changed.
    pub fn reload(&self) -> Result<bool, GuardpostError> {
        let fresh = load_entries(&self.path)?;

        let changed = {
            let mut entries = write_lock(&self.entries);
            if *entries == fresh {
                false
            } else {
                *entries = fresh;
                true
            }
        };

        if changed {
            debug!(path = %self.path.display(), "store changed on disk");
            publish(&self.notify);
        }
        Ok(changed)
    }

    /// Apply `mutate` to the entries currently on disk, persist, then commit.
    ///
    /// Keys written by other handles since the last reload are preserved.
    /// In-memory state is untouched if the write fails.
    fn commit<F>(&self, mutate: F) -> Result<(), GuardpostError>
    where
        F: FnOnce(&mut BTreeMap<String, String>),
    {
        let stale = {
            let mut entries = write_lock(&self.entries);
            let mut next = load_entries(&self.path)?;
            let stale = *entries != next;
            mutate(&mut next);
            self.save(&next)?;
            *entries = next;
            stale
        };

        if stale {
            debug!(path = %self.path.display(), "store changed on disk before write");
            publish(&self.notify);
        }
        publish(&self.notify);
        Ok(())
    }

    /// Save entries atomically.
    ///
    /// The record is written to a uniquely named temp file in the same
    /// directory, then renamed over the target.
    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), GuardpostError> {
        let json = StoreRecord::new(entries.clone()).to_json()?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut temp = NamedTempFile::new_in(dir)
            .map_err(|e| GuardpostError::StoreIO(format!("Failed to create temp file: {}", e)))?;

        temp.write_all(json.as_bytes())
            .map_err(|e| GuardpostError::StoreIO(format!("Failed to write temp file: {}", e)))?;

        temp.persist(&self.path).map_err(|e| {
            GuardpostError::StoreIO(format!("Failed to rename store file: {}", e.error))
        })?;

        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        read_lock(&self.entries).get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), GuardpostError> {
        self.commit(|entries| {
            entries.insert(key.to_string(), value.to_string());
        })
    }

    fn remove(&self, key: &str) -> Result<(), GuardpostError> {
        self.commit(|entries| {
            entries.remove(key);
        })
    }

    fn subscribe(&self) -> broadcast::Receiver<StoreChanged> {
        self.notify.subscribe()
    }
}

fn load_entries(path: &Path) -> Result<BTreeMap<String, String>, GuardpostError> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }

    let json = fs::read_to_string(path)
        .map_err(|e| GuardpostError::StoreIO(format!("Failed to read store file: {}", e)))?;

    Ok(StoreRecord::from_json(&json)?.into_entries())
}
