//! Guardpost configuration.

/// Configuration for the persisted store.
#[derive(Debug, Clone)]
pub struct GuardpostConfig {
    /// Namespace directory under the user data dir (e.g., "llamafolio").
    /// Each application should use a unique namespace to avoid collisions.
    pub namespace: &'static str,

    /// File name of the persisted store inside the namespace directory.
    pub file_name: &'static str,

    /// Number of change notifications buffered per subscriber.
    /// A subscriber that falls further behind recomputes from scratch.
    pub notify_capacity: usize,
}

impl Default for GuardpostConfig {
    fn default() -> Self {
        Self {
            namespace: "guardpost",
            file_name: "storage.json",
            notify_capacity: 64,
        }
    }
}

impl GuardpostConfig {
    /// Validate configuration for obvious errors.
    pub fn validate(&self) -> Result<(), crate::GuardpostError> {
        if self.namespace.is_empty() {
            return Err(crate::GuardpostError::ConfigError(
                "namespace cannot be empty".to_string(),
            ));
        }
        if self.file_name.is_empty() {
            return Err(crate::GuardpostError::ConfigError(
                "file_name cannot be empty".to_string(),
            ));
        }
        if self.file_name.contains(['/', '\\']) {
            return Err(crate::GuardpostError::ConfigError(format!(
                "file_name must not contain path separators, got {}",
                self.file_name
            )));
        }
        if self.notify_capacity == 0 {
            return Err(crate::GuardpostError::ConfigError(
                "notify_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
