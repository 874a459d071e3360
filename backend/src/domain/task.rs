//! Tasks, completion records, and their metadata.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::UserId;

/// Key/value pairs attached to a completion record when it is created.
pub type TaskMetadata = BTreeMap<String, String>;

/// Validation errors raised when parsing task identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TaskValidationError {
    /// The identifier is not a UUID.
    #[error("task id must be a valid UUID")]
    InvalidId,
}

/// Stable task identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(Uuid);

impl TaskId {
    /// Parse an identifier from its textual form.
    ///
    /// # Errors
    /// Returns [`TaskValidationError::InvalidId`] for anything but a UUID.
    pub fn new(id: impl AsRef<str>) -> Result<Self, TaskValidationError> {
        Uuid::parse_str(id.as_ref())
            .map(Self)
            .map_err(|_| TaskValidationError::InvalidId)
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

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for TaskId {
    type Err = TaskValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Identifier of a completion record (`user_tasks.id`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletionId(Uuid);

impl CompletionId {
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
}

impl fmt::Display for CompletionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// A task users can complete once for a fixed reward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    /// Stable identifier.
    pub id: TaskId,
    /// Short unique code, e.g. `follow_twitter`.
    pub code: String,
    /// Optional human-readable description; empty when absent.
    pub description: String,
    /// Points granted on completion.
    pub reward_points: u32,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

/// A task as completed by one user, as shown in status responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedTask {
    /// Completion record identifier.
    pub id: CompletionId,
    /// Completed task's code.
    pub code: String,
    /// Completed task's description; empty when absent.
    pub description: String,
    /// Reward the task grants.
    pub reward_points: u32,
    /// Metadata attached at completion time.
    pub metadata: TaskMetadata,
    /// When the task was completed.
    pub completed_at: DateTime<Utc>,
}

/// Completion record about to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCompletion {
    /// Identifier for the new record.
    pub id: CompletionId,
    /// User completing the task.
    pub user_id: UserId,
    /// Task being completed.
    pub task_id: TaskId,
    /// Completion time.
    pub completed_at: DateTime<Utc>,
    /// Metadata to store alongside the record; may be empty.
    pub metadata: TaskMetadata,
}
