//! Task completion with concurrent pre-checks and a single atomic write.
//!
//! The user and task existence checks run concurrently; the first failure
//! wins and the sibling check is dropped. Only then is the pair checked for a
//! prior completion, and finally the repository writes the completion, the
//! points increment, and the metadata in one transaction. The unique index on
//! `(user_id, task_id)` closes the window between the pre-check and the write.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{error, info, warn};

use crate::domain::ports::{
    TaskCompletionCommand, TaskCompletionRequest, TaskPersistenceError, TaskRepository,
    UserPersistenceError, UserRepository,
};
use crate::domain::{
    CompletionId, Error, ErrorCode, NewCompletion, RequestContext, TaskId, UserId,
};

/// Task completion service implementing [`TaskCompletionCommand`].
#[derive(Clone)]
pub struct TaskCompletionService<U, T> {
    users: Arc<U>,
    tasks: Arc<T>,
    clock: Arc<dyn Clock>,
}

impl<U, T> TaskCompletionService<U, T> {
    /// Create a new service over the given repositories.
    pub fn new(users: Arc<U>, tasks: Arc<T>, clock: Arc<dyn Clock>) -> Self {
        Self {
            users,
            tasks,
            clock,
        }
    }
}

impl<U, T> TaskCompletionService<U, T>
where
    U: UserRepository,
    T: TaskRepository,
{
    fn map_user_error(error: UserPersistenceError) -> Error {
        Error::internal(format!("user repository error: {error}"))
    }

    fn map_task_error(error: TaskPersistenceError, request: &TaskCompletionRequest) -> Error {
        match error {
            TaskPersistenceError::AlreadyCompleted => Error::task_already_completed(),
            TaskPersistenceError::UserMissing => {
                Error::user_not_found(format!("user {} not found", request.user_id))
            }
            TaskPersistenceError::MetadataRejected { message } => {
                Error::task_metadata_already_exists(format!(
                    "metadata for task {} rejected: {message}",
                    request.task_id
                ))
            }
            other @ (TaskPersistenceError::Connection { .. }
            | TaskPersistenceError::Query { .. }) => {
                Error::internal(format!("task repository error: {other}"))
            }
        }
    }

    async fn require_user(&self, id: &UserId) -> Result<(), Error> {
        if self.users.exists(id).await.map_err(Self::map_user_error)? {
            Ok(())
        } else {
            Err(Error::user_not_found(format!("user {id} not found")))
        }
    }

    async fn require_task(&self, id: &TaskId) -> Result<(), Error> {
        let exists = self
            .tasks
            .exists(id)
            .await
            .map_err(|err| Error::internal(format!("task repository error: {err}")))?;
        if exists {
            Ok(())
        } else {
            Err(Error::task_not_found(format!("task {id} not found")))
        }
    }
}

#[async_trait]
impl<U, T> TaskCompletionCommand for TaskCompletionService<U, T>
where
    U: UserRepository,
    T: TaskRepository,
{
    async fn complete_task(
        &self,
        ctx: &RequestContext,
        request: &TaskCompletionRequest,
    ) -> Result<CompletionId, Error> {
        tokio::try_join!(
            self.require_user(&request.user_id),
            self.require_task(&request.task_id)
        )
        .inspect_err(|err| {
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                user_id = %request.user_id,
                task_id = %request.task_id,
                code = ?err.code(),
                "task completion pre-check failed"
            );
        })?;

        let already_completed = self
            .tasks
            .is_completed(&request.user_id, &request.task_id)
            .await
            .map_err(|err| Self::map_task_error(err, request))?;
        if already_completed {
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                user_id = %request.user_id,
                task_id = %request.task_id,
                "task already completed"
            );
            return Err(Error::task_already_completed());
        }

        let completion = NewCompletion {
            id: CompletionId::random(),
            user_id: request.user_id,
            task_id: request.task_id,
            completed_at: self.clock.utc(),
            metadata: request.metadata.clone(),
        };

        match self.tasks.record_completion(&completion).await {
            Ok(id) => {
                info!(
                    trace_id = %ctx.trace_id(),
                    method = ctx.method(),
                    path = ctx.path(),
                    user_id = %request.user_id,
                    task_id = %request.task_id,
                    completion_id = %id,
                    metadata_keys = completion.metadata.len(),
                    "task completed"
                );
                Ok(id)
            }
            Err(err) => {
                let mapped = Self::map_task_error(err, request);
                if mapped.code() == ErrorCode::InternalError {
                    error!(
                        trace_id = %ctx.trace_id(),
                        method = ctx.method(),
                        path = ctx.path(),
                        error = %mapped,
                        "task completion failed"
                    );
                } else {
                    warn!(
                        trace_id = %ctx.trace_id(),
                        method = ctx.method(),
                        path = ctx.path(),
                        user_id = %request.user_id,
                        task_id = %request.task_id,
                        code = ?mapped.code(),
                        "task completion rejected"
                    );
                }
                Err(mapped)
            }
        }
    }
}

#[cfg(test)]
#[path = "task_completion_service_tests.rs"]
mod tests;
