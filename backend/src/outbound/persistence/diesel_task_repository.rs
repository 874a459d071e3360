//! PostgreSQL-backed `TaskRepository` implementation using Diesel ORM.
//!
//! Completion writes run in one transaction: the completion row, the points
//! increment, and the metadata batch commit or roll back together. The unique
//! index on `user_tasks (user_id, task_id)` closes the check-then-insert race.

use std::collections::HashMap;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sql_query;
use diesel::sql_types;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{TaskPersistenceError, TaskRepository};
use crate::domain::{CompletedTask, CompletionId, NewCompletion, TaskId, TaskMetadata, UserId};

use super::diesel_helpers::{
    foreign_key_constraint, is_unique_violation, log_diesel_error, map_basic_diesel_error,
};
use super::models::{CompletedTaskRow, MetadataRow, NewMetadataRow, NewUserTaskRow};
use super::pool::{DbPool, PoolError};
use super::schema::{tasks, user_task_metadata, user_tasks};

/// Adds the task's current reward to the user's points in one statement.
const AWARD_POINTS_SQL: &str = "UPDATE users \
     SET points = points + (SELECT reward_points FROM tasks WHERE id = $1) \
     WHERE id = $2";

const USER_FOREIGN_KEY: &str = "user_tasks_user_id_fkey";

/// Diesel-backed implementation of the `TaskRepository` port.
#[derive(Clone)]
pub struct DieselTaskRepository {
    pool: DbPool,
}

impl DieselTaskRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Failure inside the completion transaction, tagged by the step that failed.
#[derive(Debug)]
enum CompletionWriteError {
    Statement(diesel::result::Error),
    UserMissing,
    Metadata(diesel::result::Error),
}

impl From<diesel::result::Error> for CompletionWriteError {
    fn from(error: diesel::result::Error) -> Self {
        Self::Statement(error)
    }
}

fn map_pool_error(error: PoolError) -> TaskPersistenceError {
    TaskPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: &diesel::result::Error, operation: &str) -> TaskPersistenceError {
    map_basic_diesel_error(
        error,
        operation,
        TaskPersistenceError::query,
        TaskPersistenceError::connection,
    )
}

fn map_completion_error(error: CompletionWriteError) -> TaskPersistenceError {
    match error {
        CompletionWriteError::UserMissing => TaskPersistenceError::user_missing(),
        CompletionWriteError::Metadata(err) => {
            log_diesel_error(&err, "insert task metadata");
            TaskPersistenceError::metadata_rejected(err.to_string())
        }
        CompletionWriteError::Statement(err) if is_unique_violation(&err) => {
            log_diesel_error(&err, "insert completion");
            TaskPersistenceError::already_completed()
        }
        CompletionWriteError::Statement(err)
            if foreign_key_constraint(&err) == Some(USER_FOREIGN_KEY) =>
        {
            log_diesel_error(&err, "insert completion");
            TaskPersistenceError::user_missing()
        }
        CompletionWriteError::Statement(err) => map_diesel_error(&err, "record completion"),
    }
}

fn row_to_completed_task(
    row: CompletedTaskRow,
    metadata: &mut HashMap<Uuid, TaskMetadata>,
) -> Result<CompletedTask, TaskPersistenceError> {
    let reward_points = u32::try_from(row.reward_points).map_err(|_| {
        TaskPersistenceError::query(format!(
            "negative reward_points {} for task {}",
            row.reward_points, row.code
        ))
    })?;
    Ok(CompletedTask {
        id: CompletionId::from_uuid(row.id),
        metadata: metadata.remove(&row.id).unwrap_or_default(),
        code: row.code,
        description: row.description,
        reward_points,
        completed_at: row.completed_at,
    })
}

#[async_trait]
impl TaskRepository for DieselTaskRepository {
    async fn exists(&self, id: &TaskId) -> Result<bool, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            tasks::table.filter(tasks::id.eq(*id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "check task exists"))
    }

    async fn is_completed(
        &self,
        user: &UserId,
        task: &TaskId,
    ) -> Result<bool, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            user_tasks::table
                .filter(user_tasks::user_id.eq(*user.as_uuid()))
                .filter(user_tasks::task_id.eq(*task.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "check completion exists"))
    }

    async fn record_completion(
        &self,
        completion: &NewCompletion,
    ) -> Result<CompletionId, TaskPersistenceError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let user_id = *completion.user_id.as_uuid();
        let task_id = *completion.task_id.as_uuid();
        let completion_row = NewUserTaskRow {
            id: *completion.id.as_uuid(),
            user_id,
            task_id,
            completed_at: completion.completed_at,
        };
        let metadata_rows: Vec<NewMetadataRow<'_>> = completion
            .metadata
            .iter()
            .map(|(key, value)| NewMetadataRow {
                user_task_id: completion_row.id,
                key,
                value,
            })
            .collect();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        conn.transaction::<_, CompletionWriteError, _>(|conn| {
            async move {
                diesel::insert_into(user_tasks::table)
                    .values(&completion_row)
                    .execute(conn)
                    .await?;

                let awarded = sql_query(AWARD_POINTS_SQL)
                    .bind::<sql_types::Uuid, _>(task_id)
                    .bind::<sql_types::Uuid, _>(user_id)
                    .execute(conn)
                    .await?;
                if awarded == 0 {
                    return Err(CompletionWriteError::UserMissing);
                }

                if !metadata_rows.is_empty() {
                    diesel::insert_into(user_task_metadata::table)
                        .values(&metadata_rows)
                        .execute(conn)
                        .await
                        .map_err(CompletionWriteError::Metadata)?;
                }

                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(map_completion_error)?;

        Ok(completion.id)
    }

    async fn completed_tasks(
        &self,
        user: &UserId,
    ) -> Result<Vec<CompletedTask>, TaskPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<CompletedTaskRow> = user_tasks::table
            .inner_join(tasks::table)
            .filter(user_tasks::user_id.eq(*user.as_uuid()))
            .select((
                user_tasks::id,
                user_tasks::completed_at,
                tasks::code,
                tasks::description,
                tasks::reward_points,
            ))
            .order_by((user_tasks::completed_at.asc(), user_tasks::id.asc()))
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "load completed tasks"))?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let completion_ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let metadata_rows: Vec<MetadataRow> = user_task_metadata::table
            .filter(user_task_metadata::user_task_id.eq_any(completion_ids))
            .select(MetadataRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "load task metadata"))?;

        let mut metadata: HashMap<Uuid, TaskMetadata> = HashMap::new();
        for row in metadata_rows {
            metadata
                .entry(row.user_task_id)
                .or_default()
                .insert(row.key, row.value);
        }

        rows.into_iter()
            .map(|row| row_to_completed_task(row, &mut metadata))
            .collect()
    }
}
