//! Driving port for completing tasks.

use async_trait::async_trait;

use crate::domain::{CompletionId, Error, RequestContext, TaskId, TaskMetadata, UserId};

/// Request to mark a task as completed by a user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskCompletionRequest {
    /// User completing the task.
    pub user_id: UserId,
    /// Task being completed.
    pub task_id: TaskId,
    /// Optional metadata stored with the completion.
    pub metadata: TaskMetadata,
}

/// Domain use-case port for task completion.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskCompletionCommand: Send + Sync {
    /// Record the completion and award the task's points exactly once.
    async fn complete_task(
        &self,
        ctx: &RequestContext,
        request: &TaskCompletionRequest,
    ) -> Result<CompletionId, Error>;
}
