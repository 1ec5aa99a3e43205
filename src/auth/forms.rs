//! Login and registration form validation.
//!
//! Messages are user-facing and shown verbatim above the form. When several
//! fields fail, the first failing field's message wins.
//!
//! Submitting only validates and hands off state: no credentials are checked
//! here.

use crate::accessor::StorageAccessor;
use crate::auth::{REGISTER_EMAIL_KEY, VERIFICATION_PATH};
use crate::GuardpostError;
use once_cell::sync::OnceCell;
use regex::Regex;
use tracing::{debug, warn};

/// Shown when the registration email field is empty.
pub const EMAIL_REQUIRED: &str = "Enter your email address.";

/// Shown when the registration email does not look like an address.
pub const EMAIL_INVALID: &str = "Enter a valid email address.";

/// Shown when the login email field is empty.
pub const LOGIN_EMAIL_REQUIRED: &str = "Please enter your email address.";

/// Shown when the login email does not look like an address.
pub const LOGIN_EMAIL_INVALID: &str = "Please enter a valid email address.";

/// Shown when the password field is empty.
pub const PASSWORD_REQUIRED: &str = "Please enter your password.";

/// Quoted or dotted local part, then an IPv4 literal or a dotted domain
/// with an alphabetic TLD of two or more letters.
const EMAIL_PATTERN: &str = r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#;

static EMAIL_REGEX: OnceCell<Regex> = OnceCell::new();

/// Whether `email` looks like a deliverable address.
pub fn is_valid_email(email: &str) -> bool {
    match EMAIL_REGEX.get_or_try_init(|| Regex::new(EMAIL_PATTERN)) {
        Ok(re) => re.is_match(email),
        Err(e) => {
            warn!(error = %e, "email pattern failed to compile, rejecting address");
            false
        }
    }
}

/// Validate the registration email field.
pub fn validate_email(email: &str) -> Result<(), GuardpostError> {
    check_email(email, EMAIL_REQUIRED, EMAIL_INVALID)
}

/// Validate the login email field.
pub fn validate_login_email(email: &str) -> Result<(), GuardpostError> {
    check_email(email, LOGIN_EMAIL_REQUIRED, LOGIN_EMAIL_INVALID)
}

fn check_email(email: &str, required: &str, invalid: &str) -> Result<(), GuardpostError> {
    if email.is_empty() {
        return Err(GuardpostError::Validation(required.to_string()));
    }
    if !is_valid_email(email) {
        return Err(GuardpostError::Validation(invalid.to_string()));
    }
    Ok(())
}

/// Validate the password field. Only presence is checked.
pub fn validate_password(password: &str) -> Result<(), GuardpostError> {
    if password.is_empty() {
        return Err(GuardpostError::Validation(PASSWORD_REQUIRED.to_string()));
    }
    Ok(())
}

/// Login form inputs.
#[derive(Clone, Default)]
pub struct LoginForm {
    /// Email address.
    pub email: String,
    /// Password.
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl LoginForm {
    /// Create a login form.
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Validate all fields, reporting the email error first.
    pub fn validate(&self) -> Result<(), GuardpostError> {
        validate_login_email(&self.email)?;
        validate_password(&self.password)
    }

    /// Validate and accept the form.
    ///
    /// Authentication is not performed; a valid form is only logged.
    pub fn submit(&self) -> Result<(), GuardpostError> {
        self.validate()?;
        debug!(email = %self.email, "login form submitted");
        Ok(())
    }
}

/// Registration form inputs.
#[derive(Debug, Clone, Default)]
pub struct RegisterForm {
    /// Email address to register.
    pub email: String,
}

impl RegisterForm {
    /// Create a registration form.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
        }
    }

    /// Validate the email field.
    pub fn validate(&self) -> Result<(), GuardpostError> {
        validate_email(&self.email)
    }

    /// Validate, record the email for the verification step, and return the
    /// path to navigate to.
    ///
    /// `accessor` must track [`REGISTER_EMAIL_KEY`].
    pub fn submit(&self, accessor: &mut StorageAccessor) -> Result<&'static str, GuardpostError> {
        self.validate()?;
        accessor.try_set(REGISTER_EMAIL_KEY, Some(self.email.as_str()))?;
        debug!(email = %self.email, "registration email recorded");
        Ok(VERIFICATION_PATH)
    }
}
