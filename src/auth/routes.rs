//! Auth route table.

use crate::auth::{LOGIN_PATH, REGISTER_EMAIL_KEY, REGISTER_PATH, VERIFICATION_PATH};
use crate::policy::admission::RouteGuard;
use crate::routing::{RouteTarget, Router, FALLBACK_PATH};

/// Views of the auth flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthView {
    /// Email + password login.
    Login,
    /// Email-only registration.
    Register,
    /// "Check your inbox" step after registration.
    RegisterVerification,
}

/// Build the auth routes.
///
/// Unknown paths land on the login page. Verification redirects back to
/// registration until an email has been recorded.
pub fn auth_routes() -> Router<AuthView> {
    Router::new()
        .route(FALLBACK_PATH, RouteTarget::Redirect(LOGIN_PATH.to_string()))
        .route(LOGIN_PATH, RouteTarget::View(AuthView::Login))
        .route(REGISTER_PATH, RouteTarget::View(AuthView::Register))
        .route(
            VERIFICATION_PATH,
            RouteTarget::Guarded(RouteGuard::new(
                AuthView::RegisterVerification,
                [REGISTER_EMAIL_KEY],
                REGISTER_PATH,
            )),
        )
}
