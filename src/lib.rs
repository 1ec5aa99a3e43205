//! # Guardpost
//!
//! **Reactive persisted key-value snapshots and route admission for
//! client-side auth flows.**
//!
//! Guardpost keeps a small set of named values (a registration email, a
//! theme preference) in a persistent store shared by every context of an
//! application, and decides which routes may be entered based on what is
//! stored.
//!
//! ## Features
//!
//! - **Fixed-shape snapshots**: an accessor tracks a declared key set and
//!   always exposes exactly those keys, absent ones as `None`
//! - **Cross-context sync**: any mutation notifies every subscriber, which
//!   rebuilds its snapshot from the store instead of merging
//! - **Route guards**: a route renders only while all its required keys are
//!   present; removing one elsewhere redirects on the next render
//! - **Durable store**: file-backed store with atomic writes under the user
//!   data directory
//!
//! ## Quickstart
//!
//! ```no_run
//! use guardpost::auth::{auth_routes, AuthView, RegisterForm, REGISTER_EMAIL_KEY};
//! use guardpost::{FileStore, GuardpostConfig, KeyValueStore, StorageAccessor};
//! use std::sync::Arc;
//!
//! fn main() -> Result<(), guardpost::GuardpostError> {
//!     let config = GuardpostConfig {
//!         namespace: "myapp",
//!         ..GuardpostConfig::default()
//!     };
//!     let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(&config)?);
//!
//!     let mut accessor = StorageAccessor::new(store.clone(), [REGISTER_EMAIL_KEY]);
//!     let next = RegisterForm::new("user@example.com").submit(&mut accessor)?;
//!
//!     let page = auth_routes().resolve(next, &store)?;
//!     assert_eq!(page.view, AuthView::RegisterVerification);
//!     Ok(())
//! }
//! ```
//!
//! ## Semantics
//!
//! - An absent key (`None`) and an empty value (`Some("")`) are different;
//!   only absence blocks admission
//! - Writes to keys an accessor does not track are ignored with a warning
//! - A guard with no required keys always admits
//!
//! See [`StorageAccessor`] and [`policy::admission`] for details.

#![deny(warnings)]
#![deny(missing_docs)]

// Core modules
pub mod config;
pub mod errors;

// Storage layer
pub mod store;

// Accessor layer
pub mod accessor;

// Policy layer
pub mod policy;

// Routing layer
pub mod routing;

// Features
pub mod auth;
pub mod theme;

// Re-exports for public API
pub use accessor::{recompute, Snapshot, StorageAccessor, TrackedKeys};
pub use config::GuardpostConfig;
pub use errors::GuardpostError;
pub use policy::admission::{check_admission, Admission, GuardedRoute, RouteGuard};
pub use routing::{Resolution, RouteTarget, Router};
pub use store::{FileStore, KeyValueStore, MemoryStore, StoreChanged};
pub use theme::{Theme, ThemeController};
