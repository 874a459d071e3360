//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Username uniqueness and the write-once referrer are enforced here, at the
//! storage level: a unique index rejects concurrent registrations and the
//! referrer update only matches rows whose `referrer_id` is still `NULL`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use pagination::PageWindow;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{LeaderboardEntry, NewUser, User, UserId};

use super::diesel_helpers::{is_unique_violation, map_basic_diesel_error};
use super::models::{LeaderboardRow, NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    #[must_use]
    pub const fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_diesel_error(error: &diesel::result::Error, operation: &str) -> UserPersistenceError {
    map_basic_diesel_error(
        error,
        operation,
        UserPersistenceError::query,
        UserPersistenceError::connection,
    )
}

fn row_to_user(row: UserRow) -> User {
    User {
        id: UserId::from_uuid(row.id),
        username: row.username,
        password_hash: row.password_hash,
        points: row.points,
        referrer_id: row.referrer_id.map(UserId::from_uuid),
        created_at: row.created_at,
    }
}

fn row_to_entry(row: LeaderboardRow) -> LeaderboardEntry {
    LeaderboardEntry {
        id: UserId::from_uuid(row.id),
        username: row.username,
        points: row.points,
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let new_row = NewUserRow {
            id: *user.id.as_uuid(),
            username: &user.username,
            password_hash: &user.password_hash,
            created_at: user.created_at,
        };

        diesel::insert_into(users::table)
            .values(&new_row)
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map(row_to_user)
            .map_err(|err| {
                if is_unique_violation(&err) {
                    UserPersistenceError::duplicate_username(user.username.clone())
                } else {
                    map_diesel_error(&err, "create user")
                }
            })
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::id.eq(*id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "find user by id"))?;
        Ok(row.map(row_to_user))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(&err, "find user by username"))?;
        Ok(row.map(row_to_user))
    }

    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(diesel::dsl::exists(
            users::table.filter(users::id.eq(*id.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "check user exists"))
    }

    async fn set_referrer_if_unset(
        &self,
        user: &UserId,
        referrer: &UserId,
    ) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(
            users::table
                .filter(users::id.eq(*user.as_uuid()))
                .filter(users::referrer_id.is_null()),
        )
        .set(users::referrer_id.eq(Some(*referrer.as_uuid())))
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(&err, "set referrer"))?;
        Ok(updated > 0)
    }

    async fn leaderboard(
        &self,
        window: PageWindow,
    ) -> Result<Vec<LeaderboardEntry>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows: Vec<LeaderboardRow> = users::table
            .select(LeaderboardRow::as_select())
            .order_by((
                users::points.desc(),
                users::created_at.asc(),
                users::id.asc(),
            ))
            .limit(window.limit())
            .offset(window.offset())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(&err, "load leaderboard"))?;
        Ok(rows.into_iter().map(row_to_entry).collect())
    }
}
