//! On-disk store record format.
//!
//! The record is a versioned JSON document:
//!
//! ```json
//! { "version": 1, "entries": { "theme": "dark" } }
//! ```
//!
//! Unknown versions are rejected rather than guessed at.

use crate::GuardpostError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current on-disk format version.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Persisted store contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreRecord {
    /// Format version.
    pub version: u32,

    /// Stored key-value pairs.
    #[serde(default)]
    pub entries: BTreeMap<String, String>,
}

impl StoreRecord {
    /// Wrap entries in a record at the current version.
    pub fn new(entries: BTreeMap<String, String>) -> Self {
        Self {
            version: STORE_FORMAT_VERSION,
            entries,
        }
    }

    /// Serialize the record to JSON.
    pub fn to_json(&self) -> Result<String, GuardpostError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| GuardpostError::StoreIO(format!("Failed to serialize store: {}", e)))
    }

    /// Deserialize a record from JSON, rejecting unknown versions.
    pub fn from_json(json: &str) -> Result<Self, GuardpostError> {
        let record: Self = serde_json::from_str(json)
            .map_err(|e| GuardpostError::StoreCorrupt(format!("Failed to parse store: {}", e)))?;

        if record.version != STORE_FORMAT_VERSION {
            return Err(GuardpostError::StoreCorrupt(format!(
                "Unsupported store version {}",
                record.version
            )));
        }

        Ok(record)
    }

    /// Consume the record, returning its entries.
    pub fn into_entries(self) -> BTreeMap<String, String> {
        self.entries
    }
}
