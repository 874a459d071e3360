//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. When the
//! migrations change, regenerate them with `diesel print-schema` or update
//! them by hand.

diesel::table! {
    /// Registered accounts.
    ///
    /// `username` carries a unique index; `referrer_id` references another
    /// row of this table and is written at most once.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Login name, unique and immutable.
        username -> Text,
        /// Argon2 PHC string.
        password_hash -> Text,
        /// Accumulated reward points.
        points -> Int8,
        /// Referring user, if any.
        referrer_id -> Nullable<Uuid>,
        /// Registration timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Catalogue of completable tasks.
    tasks (id) {
        /// Primary key.
        id -> Uuid,
        /// Stable machine-readable code.
        code -> Varchar,
        /// Optional human-readable description; empty when absent.
        description -> Text,
        /// Points granted on completion, never negative.
        reward_points -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Completion records, unique per `(user_id, task_id)`.
    user_tasks (id) {
        /// Primary key.
        id -> Uuid,
        /// Completing user.
        user_id -> Uuid,
        /// Completed task.
        task_id -> Uuid,
        /// Completion timestamp.
        completed_at -> Timestamptz,
    }
}

diesel::table! {
    /// Key/value pairs attached to a completion record.
    user_task_metadata (user_task_id, key) {
        /// Owning completion record.
        user_task_id -> Uuid,
        /// Metadata key, unique per completion.
        key -> Text,
        /// Metadata value.
        value -> Text,
    }
}

diesel::joinable!(user_tasks -> users (user_id));
diesel::joinable!(user_tasks -> tasks (task_id));
diesel::joinable!(user_task_metadata -> user_tasks (user_task_id));

diesel::allow_tables_to_appear_in_same_query!(users, tasks, user_tasks, user_task_metadata);
