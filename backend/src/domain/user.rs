//! User identity, profile, and read models.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::CompletedTask;

/// Validation errors raised when parsing user identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    /// The identifier is not a UUID.
    #[error("user id must be a valid UUID")]
    InvalidId,
}

/// Stable user identifier.
///
/// # Examples
/// ```
/// use rewards_backend::domain::UserId;
///
/// let id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").unwrap();
/// assert_eq!(id.to_string(), "3fa85f64-5717-4562-b3fc-2c963f66afa6");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(Uuid);

impl UserId {
    /// Parse an identifier from its textual form.
    ///
    /// # Errors
    /// Returns [`UserValidationError::InvalidId`] for anything but a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| UserValidationError::InvalidId)
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Generate a new random identifier.
    #[must_use]
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Access the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    /// Whether this is the all-zero UUID.
    #[must_use]
    pub fn is_nil(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = UserValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Persisted user account.
///
/// `points` only grows, and only through task completion. `referrer_id` is
/// written at most once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    /// Stable identifier.
    pub id: UserId,
    /// Unique, immutable login name.
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Accumulated reward points.
    pub points: i64,
    /// User credited with referring this one.
    pub referrer_id: Option<UserId>,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

/// Values required to register a user. Points always start at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Identifier chosen for the account.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// PHC-formatted password hash.
    pub password_hash: String,
    /// Registration time.
    pub created_at: DateTime<Utc>,
}

impl NewUser {
    /// Materialise the stored account for this registration.
    #[must_use]
    pub fn into_user(self) -> User {
        User {
            id: self.id,
            username: self.username,
            password_hash: self.password_hash,
            points: 0,
            referrer_id: None,
            created_at: self.created_at,
        }
    }
}

/// Row of the leaderboard projection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaderboardEntry {
    /// Ranked user.
    pub id: UserId,
    /// Ranked user's name.
    pub username: String,
    /// Points at the time of the query.
    pub points: i64,
}

/// A user's profile together with their completed tasks, oldest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStatus {
    /// User identifier.
    pub id: UserId,
    /// Login name.
    pub username: String,
    /// Accumulated reward points.
    pub points: i64,
    /// Referrer, when one has been linked.
    pub referrer_id: Option<UserId>,
    /// Completed tasks ordered by completion time.
    pub completed_tasks: Vec<CompletedTask>,
}

impl UserStatus {
    /// Combine a profile with its completion history.
    #[must_use]
    pub fn new(user: User, completed_tasks: Vec<CompletedTask>) -> Self {
        Self {
            id: user.id,
            username: user.username,
            points: user.points,
            referrer_id: user.referrer_id,
            completed_tasks,
        }
    }
}
