//! Route admission based on persisted key presence.
//!
//! A route is admitted when:
//! - every required key is present in the snapshot (an empty string counts)
//! - an empty requirement list is always satisfied
//!
//! Anything else redirects to the route's configured target.

use crate::accessor::{Snapshot, StorageAccessor};
use crate::store::KeyValueStore;
use crate::GuardpostError;
use std::sync::Arc;
use tracing::debug;

/// Outcome of evaluating a guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission<V> {
    /// Render the protected view.
    Admit(V),
    /// Navigate to another path instead.
    Redirect {
        /// Redirect target.
        to: String,
    },
}

impl<V> Admission<V> {
    /// Whether the view was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admit(_))
    }

    /// Redirect target, if this is a redirect.
    pub fn redirect_target(&self) -> Option<&str> {
        match self {
            Admission::Admit(_) => None,
            Admission::Redirect { to } => Some(to),
        }
    }
}

/// Check that every required key is present in the snapshot.
///
/// # Returns
/// * `Ok(())` - All required keys present
/// * `Err(KeyMissing)` - The first required key that is absent or untracked
pub fn check_admission<S: AsRef<str>>(
    snapshot: &Snapshot,
    required: &[S],
) -> Result<(), GuardpostError> {
    for key in required {
        let key = key.as_ref();
        if !snapshot.is_present(key) {
            return Err(GuardpostError::KeyMissing {
                key: key.to_string(),
            });
        }
    }

    Ok(())
}

/// A protected view, the keys it requires, and where to go without them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteGuard<V> {
    view: V,
    required: Vec<String>,
    redirect_to: String,
}

impl<V> RouteGuard<V> {
    /// Create a guard for `view`.
    pub fn new<I, S>(view: V, required: I, redirect_to: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            view,
            required: required.into_iter().map(Into::into).collect(),
            redirect_to: redirect_to.into(),
        }
    }

    /// Protected view.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Keys that must all be present.
    pub fn required(&self) -> &[String] {
        &self.required
    }

    /// Redirect target on failure.
    pub fn redirect_to(&self) -> &str {
        &self.redirect_to
    }

    /// Decide admission against a snapshot.
    pub fn evaluate(&self, snapshot: &Snapshot) -> Admission<&V> {
        match check_admission(snapshot, self.required.as_slice()) {
            Ok(()) => Admission::Admit(&self.view),
            Err(e) => {
                debug!(reason = %e, to = %self.redirect_to, "route guard redirecting");
                Admission::Redirect {
                    to: self.redirect_to.clone(),
                }
            }
        }
    }

    /// Mount the guard on a store, tracking exactly its required keys.
    pub fn mount(self, store: Arc<dyn KeyValueStore>) -> GuardedRoute<V> {
        GuardedRoute::new(store, self)
    }
}

/// A guard mounted on a store.
///
/// Every [`render`](Self::render) first applies pending change
/// notifications, so a key removed by another context redirects on the
/// next render.
#[derive(Debug)]
pub struct GuardedRoute<V> {
    guard: RouteGuard<V>,
    accessor: StorageAccessor,
}

impl<V> GuardedRoute<V> {
    /// Mount `guard` on `store`.
    pub fn new(store: Arc<dyn KeyValueStore>, guard: RouteGuard<V>) -> Self {
        let accessor = StorageAccessor::new(store, guard.required.iter().cloned());
        Self { guard, accessor }
    }

    /// Evaluate the guard against the latest store state.
    pub fn render(&mut self) -> Admission<&V> {
        self.accessor.sync();
        self.guard.evaluate(self.accessor.snapshot())
    }

    /// Wait for the next store change, then re-evaluate.
    ///
    /// Returns `None` if the store can no longer send notifications.
    pub async fn rerender(&mut self) -> Option<Admission<&V>> {
        if !self.accessor.changed().await {
            return None;
        }
        Some(self.guard.evaluate(self.accessor.snapshot()))
    }

    /// The guard being enforced.
    pub fn guard(&self) -> &RouteGuard<V> {
        &self.guard
    }

    /// Snapshot of the required keys.
    pub fn snapshot(&self) -> &Snapshot {
        self.accessor.snapshot()
    }
}
