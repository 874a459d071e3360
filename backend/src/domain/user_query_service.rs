//! Read-side use-cases: leaderboard and user status.

use std::sync::Arc;

use async_trait::async_trait;
use pagination::PageWindow;
use tracing::debug;

use crate::domain::ports::{
    LeaderboardQuery, TaskPersistenceError, TaskRepository, UserPersistenceError, UserRepository,
    UserStatusQuery,
};
use crate::domain::{Error, LeaderboardEntry, RequestContext, UserId, UserStatus};

/// Query service implementing [`LeaderboardQuery`] and [`UserStatusQuery`].
#[derive(Clone)]
pub struct UserQueryService<U, T> {
    users: Arc<U>,
    tasks: Arc<T>,
}

impl<U, T> UserQueryService<U, T> {
    /// Create a new service over the given repositories.
    pub fn new(users: Arc<U>, tasks: Arc<T>) -> Self {
        Self { users, tasks }
    }
}

fn map_user_error(error: UserPersistenceError) -> Error {
    Error::internal(format!("user repository error: {error}"))
}

fn map_task_error(error: TaskPersistenceError) -> Error {
    Error::internal(format!("task repository error: {error}"))
}

#[async_trait]
impl<U, T> LeaderboardQuery for UserQueryService<U, T>
where
    U: UserRepository,
    T: TaskRepository,
{
    async fn leaderboard(
        &self,
        ctx: &RequestContext,
        window: PageWindow,
    ) -> Result<Vec<LeaderboardEntry>, Error> {
        let entries = self.users.leaderboard(window).await.map_err(map_user_error)?;
        debug!(
            trace_id = %ctx.trace_id(),
            method = ctx.method(),
            path = ctx.path(),
            limit = window.limit(),
            offset = window.offset(),
            returned = entries.len(),
            "leaderboard page loaded"
        );
        Ok(entries)
    }
}

#[async_trait]
impl<U, T> UserStatusQuery for UserQueryService<U, T>
where
    U: UserRepository,
    T: TaskRepository,
{
    async fn status(&self, ctx: &RequestContext, user_id: &UserId) -> Result<UserStatus, Error> {
        let user = self
            .users
            .find_by_id(user_id)
            .await
            .map_err(map_user_error)?
            .ok_or_else(|| Error::user_not_found(format!("user {user_id} not found")))?;
        let completed = self
            .tasks
            .completed_tasks(user_id)
            .await
            .map_err(map_task_error)?;
        debug!(
            trace_id = %ctx.trace_id(),
            method = ctx.method(),
            path = ctx.path(),
            user_id = %user_id,
            completed = completed.len(),
            "user status loaded"
        );
        Ok(UserStatus::new(user, completed))
    }
}
