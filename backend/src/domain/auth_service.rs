//! Authentication with auto-registration.
//!
//! An unknown username registers a new account with a freshly hashed
//! password; a known one must present the matching password. Either way the
//! caller receives a non-expiring bearer token for the account.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    CredentialHashError, CredentialHasher, LoginService, TokenError, TokenIssuer,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    AuthSession, Error, LoginCredentials, NewUser, RequestContext, User, UserId,
};

/// Login service implementing the [`LoginService`] driving port.
#[derive(Clone)]
pub struct AuthService<U, H, T> {
    users: Arc<U>,
    hasher: Arc<H>,
    tokens: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, H, T> AuthService<U, H, T> {
    /// Create a new service over the given adapters.
    pub fn new(users: Arc<U>, hasher: Arc<H>, tokens: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            hasher,
            tokens,
            clock,
        }
    }
}

impl<U, H, T> AuthService<U, H, T>
where
    U: UserRepository,
    H: CredentialHasher,
    T: TokenIssuer,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        Error::internal(format!("user repository error: {error}"))
    }

    fn map_hash_error(error: CredentialHashError) -> Error {
        Error::internal(format!("credential hashing error: {error}"))
    }

    fn map_token_error(error: TokenError) -> Error {
        Error::internal(format!("token issuing error: {error}"))
    }

    async fn verify_password(
        &self,
        ctx: &RequestContext,
        user: &User,
        credentials: &LoginCredentials,
    ) -> Result<UserId, Error> {
        let matches = self
            .hasher
            .verify(credentials.password(), &user.password_hash)
            .await
            .map_err(Self::map_hash_error)?;
        if matches {
            Ok(user.id)
        } else {
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                user_id = %user.id,
                "password mismatch"
            );
            Err(Error::invalid_credentials())
        }
    }

    async fn register(
        &self,
        ctx: &RequestContext,
        credentials: &LoginCredentials,
    ) -> Result<UserId, Error> {
        let password_hash = self
            .hasher
            .hash(credentials.password())
            .await
            .map_err(Self::map_hash_error)?;
        let registration = NewUser {
            id: UserId::random(),
            username: credentials.username().to_owned(),
            password_hash,
            created_at: self.clock.utc(),
        };

        match self.users.create(&registration).await {
            Ok(user) => {
                info!(
                    trace_id = %ctx.trace_id(),
                    method = ctx.method(),
                    path = ctx.path(),
                    user_id = %user.id,
                    "registered new user"
                );
                Ok(user.id)
            }
            Err(UserPersistenceError::DuplicateUsername { .. }) => {
                // Lost a registration race; authenticate against the winner.
                let winner = self
                    .users
                    .find_by_username(credentials.username())
                    .await
                    .map_err(Self::map_user_error)?
                    .ok_or_else(|| {
                        Error::internal("username conflict but no matching user found")
                    })?;
                self.verify_password(ctx, &winner, credentials).await
            }
            Err(err) => {
                error!(
                    trace_id = %ctx.trace_id(),
                    method = ctx.method(),
                    path = ctx.path(),
                    error = %err,
                    "user registration failed"
                );
                Err(Self::map_user_error(err))
            }
        }
    }
}

#[async_trait]
impl<U, H, T> LoginService for AuthService<U, H, T>
where
    U: UserRepository,
    H: CredentialHasher,
    T: TokenIssuer,
{
    async fn authenticate(
        &self,
        ctx: &RequestContext,
        credentials: &LoginCredentials,
    ) -> Result<AuthSession, Error> {
        let existing = self
            .users
            .find_by_username(credentials.username())
            .await
            .map_err(Self::map_user_error)?;

        let user_id = match existing {
            Some(user) => self.verify_password(ctx, &user, credentials).await?,
            None => self.register(ctx, credentials).await?,
        };

        let token = self.tokens.issue(&user_id).map_err(Self::map_token_error)?;
        Ok(AuthSession { token, user_id })
    }
}

#[cfg(test)]
#[path = "auth_service_tests.rs"]
mod tests;
