//! Guardpost error types.

use thiserror::Error;

/// Errors that can occur while reading, writing or routing on persisted state.
#[derive(Debug, Error)]
pub enum GuardpostError {
    /// Configuration is invalid.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Store I/O error.
    #[error("Store I/O error: {0}")]
    StoreIO(String),

    /// Persisted store file could not be understood.
    #[error("Store file corrupt: {0}")]
    StoreCorrupt(String),

    /// Write to a key the accessor does not track.
    #[error("Key \"{key}\" is not tracked by this accessor")]
    UntrackedKey {
        /// The key that was written.
        key: String,
    },

    /// Required key is absent from the store.
    #[error("Required key missing: {key}")]
    KeyMissing {
        /// The key that was required but absent.
        key: String,
    },

    /// Form input failed validation.
    #[error("{0}")]
    Validation(String),

    /// No route matches the path and no fallback is configured.
    #[error("No route for path: {path}")]
    RouteNotFound {
        /// The path that was resolved.
        path: String,
    },

    /// Redirects did not settle on a view.
    #[error("Too many redirects starting from: {path}")]
    RedirectLoop {
        /// The path resolution started from.
        path: String,
    },
}
