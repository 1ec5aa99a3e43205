//! Authentication flow: forms and the route table tying them together.
//!
//! Registration records the email under [`REGISTER_EMAIL_KEY`] and moves on
//! to [`VERIFICATION_PATH`], which stays reachable only while that key is
//! present.

pub mod forms;
pub mod routes;

/// Store key holding the email awaiting verification.
pub const REGISTER_EMAIL_KEY: &str = "register-email";

/// Login page.
pub const LOGIN_PATH: &str = "/login";

/// Registration page.
pub const REGISTER_PATH: &str = "/register";

/// Email verification page, guarded by [`REGISTER_EMAIL_KEY`].
pub const VERIFICATION_PATH: &str = "/register/verification";

pub use forms::{LoginForm, RegisterForm};
pub use routes::{auth_routes, AuthView};
