//! Port abstraction for user persistence adapters and their errors.
use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::{LeaderboardEntry, NewUser, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already owns the username.
        DuplicateUsername { username: String } => "username {username} is already registered",
    }
}

/// Driven port over the `users` table.
///
/// Adapters own the storage-level invariants: usernames are unique and the
/// referrer is written with a conditional update so it is never overwritten.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account with zero points.
    ///
    /// Fails with [`UserPersistenceError::DuplicateUsername`] when the
    /// username is taken, including by a concurrent registration.
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by login name.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Report whether a user exists without loading the row.
    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError>;

    /// Link `referrer` to `user` only if no referrer is set yet.
    ///
    /// Returns `true` when the link was written and `false` when no row
    /// matched, either because the user is gone or already has a referrer.
    async fn set_referrer_if_unset(
        &self,
        user: &UserId,
        referrer: &UserId,
    ) -> Result<bool, UserPersistenceError>;

    /// Users ordered by points descending, then oldest account first, then id.
    async fn leaderboard(
        &self,
        window: PageWindow,
    ) -> Result<Vec<LeaderboardEntry>, UserPersistenceError>;
}
