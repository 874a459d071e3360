//! Request and response bodies for the users API.
//!
//! These DTOs pin the wire format (snake_case keys, omitted empty fields)
//! independently of the domain records they are built from.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::domain::{
    AuthSession, CompletedTask, LeaderboardEntry, LoginCredentials, LoginValidationError,
    TaskMetadata, UserStatus,
};

/// Error envelope returned by every failing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Human-readable description; `internal server error` for 5xx.
    #[schema(example = "task already completed")]
    pub errors: String,
}

/// Body for `POST /users/auth`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthRequest {
    /// Login name; registers a new account on first use.
    #[schema(example = "ada")]
    pub username: String,
    /// Plain-text password.
    pub password: String,
}

impl TryFrom<AuthRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: AuthRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Issued bearer token and the account it identifies.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    /// Signed bearer token.
    pub token: String,
    /// Account identifier.
    pub user_id: Uuid,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        Self {
            token: session.token,
            user_id: *session.user_id.as_uuid(),
        }
    }
}

/// One leaderboard row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntryBody {
    /// Account identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Accumulated points.
    pub points: i64,
}

impl From<LeaderboardEntry> for LeaderboardEntryBody {
    fn from(entry: LeaderboardEntry) -> Self {
        Self {
            id: *entry.id.as_uuid(),
            username: entry.username,
            points: entry.points,
        }
    }
}

/// A completed task inside a status response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CompletedTaskBody {
    /// Completion record identifier.
    pub id: Uuid,
    /// Task code.
    pub code: String,
    /// Task description; omitted when empty.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Reward granted by the task.
    pub points: u32,
    /// Metadata captured at completion; omitted when empty.
    #[serde(default, skip_serializing_if = "TaskMetadata::is_empty")]
    #[schema(value_type = BTreeMap<String, String>)]
    pub metadata: TaskMetadata,
    /// Completion timestamp.
    pub completed_at: DateTime<Utc>,
}

impl From<CompletedTask> for CompletedTaskBody {
    fn from(task: CompletedTask) -> Self {
        Self {
            id: *task.id.as_uuid(),
            code: task.code,
            description: task.description,
            points: task.reward_points,
            metadata: task.metadata,
            completed_at: task.completed_at,
        }
    }
}

/// Response for `GET /users/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserStatusBody {
    /// Account identifier.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Accumulated points.
    pub points: i64,
    /// Referring account; omitted when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer_id: Option<Uuid>,
    /// Completed tasks, oldest first.
    pub completed_tasks: Vec<CompletedTaskBody>,
}

impl From<UserStatus> for UserStatusBody {
    fn from(status: UserStatus) -> Self {
        Self {
            id: *status.id.as_uuid(),
            username: status.username,
            points: status.points,
            referrer_id: status.referrer_id.map(|id| *id.as_uuid()),
            completed_tasks: status
                .completed_tasks
                .into_iter()
                .map(CompletedTaskBody::from)
                .collect(),
        }
    }
}

/// Body for `POST /users/{id}/task/complete`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TaskCompleteRequest {
    /// Task to complete; must not be the nil UUID.
    pub task_id: Uuid,
    /// Optional string pairs stored with the completion.
    #[serde(default)]
    #[schema(value_type = Option<BTreeMap<String, String>>)]
    pub metadata: Option<TaskMetadata>,
}

/// Body for `POST /users/{id}/referrer`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReferrerRequest {
    /// Referring account; must not be the nil UUID.
    pub referrer_id: Uuid,
}

/// Acknowledgement body for successful mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StatusBody {
    /// Always `ok`.
    #[schema(example = "ok")]
    pub status: String,
}

impl StatusBody {
    /// The `{"status": "ok"}` acknowledgement.
    #[must_use]
    pub fn ok() -> Self {
        Self {
            status: "ok".to_owned(),
        }
    }
}
