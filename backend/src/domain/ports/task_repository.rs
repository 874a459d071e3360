//! Port abstraction for task and completion persistence.
use async_trait::async_trait;

use crate::domain::{CompletedTask, CompletionId, NewCompletion, TaskId, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by task repository adapters.
    pub enum TaskPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "task repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "task repository query failed: {message}",
        /// A completion for the same user and task already exists.
        AlreadyCompleted => "task already completed",
        /// The points increment matched no user row.
        UserMissing => "user disappeared before points were awarded",
        /// The metadata batch could not be inserted.
        MetadataRejected { message: String } => "task metadata rejected: {message}",
    }
}

/// Driven port over `tasks`, `user_tasks`, and `user_task_metadata`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRepository: Send + Sync {
    /// Report whether a task exists.
    async fn exists(&self, id: &TaskId) -> Result<bool, TaskPersistenceError>;

    /// Report whether `user` has already completed `task`.
    async fn is_completed(
        &self,
        user: &UserId,
        task: &TaskId,
    ) -> Result<bool, TaskPersistenceError>;

    /// Atomically record a completion.
    ///
    /// In one transaction: insert the completion record, add the task's
    /// current reward to the user's points, and insert the metadata batch.
    /// Any failure rolls back all three. A uniqueness conflict on
    /// `(user, task)` surfaces as [`TaskPersistenceError::AlreadyCompleted`].
    async fn record_completion(
        &self,
        completion: &NewCompletion,
    ) -> Result<CompletionId, TaskPersistenceError>;

    /// Completed tasks for `user`, oldest first, with their metadata.
    async fn completed_tasks(
        &self,
        user: &UserId,
    ) -> Result<Vec<CompletedTask>, TaskPersistenceError>;
}
