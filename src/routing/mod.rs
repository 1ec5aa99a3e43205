//! Path-to-view routing with guarded routes.
//!
//! A [`Router`] maps exact paths to targets and falls back to the `*`
//! route for anything else. Resolution follows redirects, both static ones
//! and those issued by guards, until it reaches a view.

use crate::policy::admission::{Admission, RouteGuard};
use crate::store::KeyValueStore;
use crate::GuardpostError;
use std::sync::Arc;
use tracing::debug;

/// Path that matches any otherwise unrouted path.
pub const FALLBACK_PATH: &str = "*";

/// Redirect hops allowed before resolution gives up.
pub const MAX_REDIRECTS: usize = 8;

/// What a path leads to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteTarget<V> {
    /// Render a view unconditionally.
    View(V),
    /// Navigate to another path.
    Redirect(String),
    /// Render a view only when its required keys are present.
    Guarded(RouteGuard<V>),
}

/// Result of resolving a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<V> {
    /// View to render.
    pub view: V,
    /// Path the view was reached at.
    pub path: String,
    /// Whether any redirect was followed.
    pub redirected: bool,
}

/// Ordered route table.
#[derive(Debug, Clone)]
pub struct Router<V> {
    routes: Vec<(String, RouteTarget<V>)>,
}

impl<V> Default for Router<V> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<V: Clone> Router<V> {
    /// Create an empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a route. A later route for the same path replaces the earlier one.
    pub fn route(mut self, path: impl Into<String>, target: RouteTarget<V>) -> Self {
        let path = path.into();
        match self.routes.iter_mut().find(|(p, _)| *p == path) {
            Some((_, existing)) => *existing = target,
            None => self.routes.push((path, target)),
        }
        self
    }

    /// Target for `path`, falling back to the `*` route.
    pub fn target(&self, path: &str) -> Option<&RouteTarget<V>> {
        self.find(path).or_else(|| self.find(FALLBACK_PATH))
    }

    fn find(&self, path: &str) -> Option<&RouteTarget<V>> {
        self.routes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, target)| target)
    }

    /// Resolve `path` to a view, evaluating guards against `store`.
    ///
    /// Each guarded route is mounted for the duration of its check only.
    ///
    /// # Errors
    /// - `RouteNotFound` - No route and no fallback
    /// - `RedirectLoop` - More than [`MAX_REDIRECTS`] hops
    pub fn resolve(
        &self,
        path: &str,
        store: &Arc<dyn KeyValueStore>,
    ) -> Result<Resolution<V>, GuardpostError> {
        let mut current = path.to_string();

        for hop in 0..=MAX_REDIRECTS {
            let target = self
                .target(&current)
                .ok_or_else(|| GuardpostError::RouteNotFound {
                    path: current.clone(),
                })?;

            let next = match target {
                RouteTarget::View(view) => {
                    return Ok(Resolution {
                        view: view.clone(),
                        path: current,
                        redirected: hop > 0,
                    });
                }
                RouteTarget::Redirect(to) => to.clone(),
                RouteTarget::Guarded(guard) => {
                    let mut mounted = guard.clone().mount(Arc::clone(store));
                    let outcome = mounted.render();
                    match outcome {
                        Admission::Admit(view) => {
                            return Ok(Resolution {
                                view: view.clone(),
                                path: current,
                                redirected: hop > 0,
                            });
                        }
                        Admission::Redirect { to } => to,
                    }
                }
            };

            debug!(from = %current, to = %next, "following redirect");
            current = next;
        }

        Err(GuardpostError::RedirectLoop {
            path: path.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn shared(store: &MemoryStore) -> Arc<dyn KeyValueStore> {
        Arc::new(store.clone())
    }

    #[test]
    fn test_resolve_exact_view() {
        let router = Router::new().route("/home", RouteTarget::View("home"));
        let store = shared(&MemoryStore::new());

        let resolution = router.resolve("/home", &store).unwrap();
        assert_eq!(resolution.view, "home");
        assert_eq!(resolution.path, "/home");
        assert!(!resolution.redirected);
    }

    #[test]
    fn test_resolve_fallback_redirect() {
        let router = Router::new()
            .route("/home", RouteTarget::View("home"))
            .route(FALLBACK_PATH, RouteTarget::Redirect("/home".to_string()));
        let store = shared(&MemoryStore::new());

        let resolution = router.resolve("/unknown/deep", &store).unwrap();
        assert_eq!(resolution.view, "home");
        assert_eq!(resolution.path, "/home");
        assert!(resolution.redirected);
    }

    #[test]
    fn test_resolve_no_route() {
        let router = Router::new().route("/home", RouteTarget::View("home"));
        let store = shared(&MemoryStore::new());

        let result = router.resolve("/elsewhere", &store);
        assert!(matches!(result, Err(GuardpostError::RouteNotFound { path }) if path == "/elsewhere"));
    }

    #[test]
    fn test_resolve_redirect_loop() {
        let router: Router<&str> = Router::new()
            .route("/a", RouteTarget::Redirect("/b".to_string()))
            .route("/b", RouteTarget::Redirect("/a".to_string()));
        let store = shared(&MemoryStore::new());

        let result = router.resolve("/a", &store);
        assert!(matches!(result, Err(GuardpostError::RedirectLoop { path }) if path == "/a"));
    }

    #[test]
    fn test_resolve_guarded_route() {
        let router = Router::new()
            .route("/open", RouteTarget::View("open"))
            .route(
                "/secret",
                RouteTarget::Guarded(RouteGuard::new("secret", ["token"], "/open")),
            );
        let memory = MemoryStore::new();
        let store = shared(&memory);

        let denied = router.resolve("/secret", &store).unwrap();
        assert_eq!(denied.view, "open");
        assert!(denied.redirected);

        memory.set("token", "").unwrap();
        let admitted = router.resolve("/secret", &store).unwrap();
        assert_eq!(admitted.view, "secret");
        assert_eq!(admitted.path, "/secret");
        assert!(!admitted.redirected);
    }

    #[test]
    fn test_resolve_does_not_leak_subscriptions() {
        let router = Router::new()
            .route(
                "/secret",
                RouteTarget::Guarded(RouteGuard::new("secret", ["token"], "/secret-ok")),
            )
            .route("/secret-ok", RouteTarget::View("fallback"));
        let memory = MemoryStore::new();
        let store = shared(&memory);

        router.resolve("/secret", &store).unwrap();
        assert_eq!(memory.subscriber_count(), 0);
    }

    #[test]
    fn test_route_replaces_same_path() {
        let router = Router::new()
            .route("/x", RouteTarget::View(1))
            .route("/x", RouteTarget::View(2));
        assert_eq!(router.target("/x"), Some(&RouteTarget::View(2)));
    }
}
