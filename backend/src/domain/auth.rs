//! Authentication primitives: validated credentials and issued sessions.
//!
//! Inbound adapters build [`LoginCredentials`] from raw request fields before
//! calling the login port, so blank input never reaches the service.

use thiserror::Error;
use zeroize::Zeroizing;

use super::UserId;

/// Validation failures for raw login input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoginValidationError {
    /// Username was empty.
    #[error("username must not be empty")]
    EmptyUsername,
    /// Password was blank.
    #[error("password must not be empty")]
    EmptyPassword,
}

/// Validated login credentials.
///
/// ## Invariants
/// - `username` is non-empty and kept verbatim, so `" ada"` and `"ada"` are
///   distinct accounts.
/// - `password` is non-empty and kept verbatim; it is wiped on drop.
///
/// # Examples
/// ```
/// use rewards_backend::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada", "hunter2").unwrap();
/// assert_eq!(creds.username(), "ada");
/// assert_eq!(creds.password(), "hunter2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    username: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    ///
    /// # Errors
    /// Returns [`LoginValidationError`] when either field is empty.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, LoginValidationError> {
        if username.is_empty() {
            return Err(LoginValidationError::EmptyUsername);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            username: username.to_owned(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for lookups and registration.
    #[must_use]
    pub fn username(&self) -> &str {
        self.username.as_str()
    }

    /// Plain-text password supplied by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Result of a successful authentication: a bearer token and its subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthSession {
    /// Signed bearer token.
    pub token: String,
    /// User the token was issued for.
    pub user_id: UserId,
}
