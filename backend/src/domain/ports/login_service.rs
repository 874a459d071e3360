//! Driving port for login/authentication use-cases.
//!
//! Inbound adapters call it to authenticate credentials without knowing the
//! backing infrastructure, so HTTP handler tests can substitute a double.

use async_trait::async_trait;

use crate::domain::{AuthSession, Error, LoginCredentials, RequestContext};

/// Domain use-case port for authentication with auto-registration.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Authenticate an existing user, or register the username on first use,
    /// and issue a bearer token for the account.
    async fn authenticate(
        &self,
        ctx: &RequestContext,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, Error>;
}
