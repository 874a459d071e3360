//! Driving port for a user's status view.

use async_trait::async_trait;

use crate::domain::{Error, RequestContext, UserId, UserStatus};

/// Domain use-case port returning a profile with its completion history.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserStatusQuery: Send + Sync {
    /// Profile and completed tasks of `user_id`.
    async fn status(&self, ctx: &RequestContext, user_id: &UserId) -> Result<UserStatus, Error>;
}
