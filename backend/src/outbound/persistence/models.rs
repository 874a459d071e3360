//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{user_task_metadata, user_tasks, users};

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub password_hash: String,
    pub points: i64,
    pub referrer_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for registering a user.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Leaderboard projection of the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LeaderboardRow {
    pub id: Uuid,
    pub username: String,
    pub points: i64,
}

/// Insertable completion record.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_tasks)]
pub(crate) struct NewUserTaskRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub task_id: Uuid,
    pub completed_at: DateTime<Utc>,
}

/// Insertable metadata pair.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = user_task_metadata)]
pub(crate) struct NewMetadataRow<'a> {
    pub user_task_id: Uuid,
    pub key: &'a str,
    pub value: &'a str,
}

/// Completion joined with its task, selected column by column.
#[derive(Debug, Clone, Queryable)]
pub(crate) struct CompletedTaskRow {
    pub id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub code: String,
    pub description: String,
    pub reward_points: i32,
}

/// Row struct for reading metadata pairs.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = user_task_metadata)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct MetadataRow {
    pub user_task_id: Uuid,
    pub key: String,
    pub value: String,
}
