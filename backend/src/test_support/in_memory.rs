//! In-memory implementation of the user and task repositories.
//!
//! All state sits behind one mutex, so every port call is atomic in the same
//! way the PostgreSQL adapter's transactions and unique indexes are:
//! duplicate usernames and duplicate `(user, task)` completions are rejected
//! and points are awarded in the same critical section as the insert.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use pagination::PageWindow;

use crate::domain::ports::{
    TaskPersistenceError, TaskRepository, UserPersistenceError, UserRepository,
};
use crate::domain::{
    CompletedTask, CompletionId, LeaderboardEntry, NewCompletion, NewUser, Task, TaskId,
    TaskMetadata, User, UserId,
};

#[derive(Debug, Clone)]
struct CompletionRow {
    id: CompletionId,
    user_id: UserId,
    task_id: TaskId,
    completed_at: chrono::DateTime<chrono::Utc>,
    metadata: TaskMetadata,
}

#[derive(Debug, Default)]
struct StoreState {
    users: HashMap<UserId, User>,
    tasks: HashMap<TaskId, Task>,
    completions: Vec<CompletionRow>,
}

/// Thread-safe store backing both repository ports.
///
/// Share one instance between services through `Arc` so they observe the same
/// data.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: Mutex<StoreState>,
}

impl InMemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `tasks`.
    #[must_use]
    pub fn with_tasks(tasks: impl IntoIterator<Item = Task>) -> Self {
        let store = Self::new();
        for task in tasks {
            store.insert_task(task);
        }
        store
    }

    /// Add or replace a task.
    pub fn insert_task(&self, task: Task) {
        self.lock().tasks.insert(task.id, task);
    }

    /// Snapshot of a stored user.
    #[must_use]
    pub fn user(&self, id: &UserId) -> Option<User> {
        self.lock().users.get(id).cloned()
    }

    /// Number of completion records for `user`.
    #[must_use]
    pub fn completion_count(&self, user: &UserId) -> usize {
        self.lock()
            .completions
            .iter()
            .filter(|row| row.user_id == *user)
            .count()
    }

    /// Number of registered users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.lock().users.len()
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.state
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn create(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock();
        if state
            .users
            .values()
            .any(|existing| existing.username == user.username)
        {
            return Err(UserPersistenceError::duplicate_username(user.username.clone()));
        }
        let stored = user.clone().into_user();
        state.users.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn exists(&self, id: &UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock().users.contains_key(id))
    }

    async fn set_referrer_if_unset(
        &self,
        user: &UserId,
        referrer: &UserId,
    ) -> Result<bool, UserPersistenceError> {
        let mut state = self.lock();
        if !state.users.contains_key(referrer) {
            return Err(UserPersistenceError::query("referrer foreign key violated"));
        }
        match state.users.get_mut(user) {
            Some(row) if row.referrer_id.is_none() => {
                row.referrer_id = Some(*referrer);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn leaderboard(
        &self,
        window: PageWindow,
    ) -> Result<Vec<LeaderboardEntry>, UserPersistenceError> {
        let state = self.lock();
        let mut users: Vec<&User> = state.users.values().collect();
        users.sort_by(|a, b| {
            b.points
                .cmp(&a.points)
                .then(a.created_at.cmp(&b.created_at))
                .then(a.id.cmp(&b.id))
        });
        let offset = usize::try_from(window.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(window.limit()).unwrap_or(0);
        Ok(users
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|user| LeaderboardEntry {
                id: user.id,
                username: user.username.clone(),
                points: user.points,
            })
            .collect())
    }
}

#[async_trait]
impl TaskRepository for InMemoryStore {
    async fn exists(&self, id: &TaskId) -> Result<bool, TaskPersistenceError> {
        Ok(self.lock().tasks.contains_key(id))
    }

    async fn is_completed(
        &self,
        user: &UserId,
        task: &TaskId,
    ) -> Result<bool, TaskPersistenceError> {
        Ok(self
            .lock()
            .completions
            .iter()
            .any(|row| row.user_id == *user && row.task_id == *task))
    }

    async fn record_completion(
        &self,
        completion: &NewCompletion,
    ) -> Result<CompletionId, TaskPersistenceError> {
        let mut state = self.lock();
        if state
            .completions
            .iter()
            .any(|row| row.user_id == completion.user_id && row.task_id == completion.task_id)
        {
            return Err(TaskPersistenceError::already_completed());
        }
        let reward = state
            .tasks
            .get(&completion.task_id)
            .map(|task| i64::from(task.reward_points))
            .ok_or_else(|| TaskPersistenceError::query("task foreign key violated"))?;
        let user = state
            .users
            .get_mut(&completion.user_id)
            .ok_or_else(TaskPersistenceError::user_missing)?;
        user.points += reward;
        state.completions.push(CompletionRow {
            id: completion.id,
            user_id: completion.user_id,
            task_id: completion.task_id,
            completed_at: completion.completed_at,
            metadata: completion.metadata.clone(),
        });
        Ok(completion.id)
    }

    async fn completed_tasks(
        &self,
        user: &UserId,
    ) -> Result<Vec<CompletedTask>, TaskPersistenceError> {
        let state = self.lock();
        let mut rows: Vec<&CompletionRow> = state
            .completions
            .iter()
            .filter(|row| row.user_id == *user)
            .collect();
        rows.sort_by(|a, b| {
            a.completed_at
                .cmp(&b.completed_at)
                .then(a.id.cmp(&b.id))
        });
        rows.into_iter()
            .map(|row| {
                let task = state.tasks.get(&row.task_id).ok_or_else(|| {
                    TaskPersistenceError::query(format!("task {} vanished", row.task_id))
                })?;
                Ok(CompletedTask {
                    id: row.id,
                    code: task.code.clone(),
                    description: task.description.clone(),
                    reward_points: task.reward_points,
                    metadata: row.metadata.clone(),
                    completed_at: row.completed_at,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! Behaviour checks for the in-memory store's atomicity guarantees.
    use super::*;
    use chrono::Utc;

    fn task(reward_points: u32) -> Task {
        Task {
            id: TaskId::random(),
            code: "follow_twitter".to_owned(),
            description: String::new(),
            reward_points,
            created_at: Utc::now(),
        }
    }

    async fn register(store: &InMemoryStore, username: &str) -> User {
        store
            .create(&NewUser {
                id: UserId::random(),
                username: username.to_owned(),
                password_hash: "hash".to_owned(),
                created_at: Utc::now(),
            })
            .await
            .expect("user registers")
    }

    #[tokio::test]
    async fn duplicate_username_is_rejected() {
        let store = InMemoryStore::new();
        register(&store, "ada").await;
        let err = store
            .create(&NewUser {
                id: UserId::random(),
                username: "ada".to_owned(),
                password_hash: "hash".to_owned(),
                created_at: Utc::now(),
            })
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, UserPersistenceError::DuplicateUsername { .. }));
    }

    #[tokio::test]
    async fn completion_awards_points_once() {
        let reward = task(50);
        let task_id = reward.id;
        let store = InMemoryStore::with_tasks([reward]);
        let user = register(&store, "ada").await;
        let completion = NewCompletion {
            id: CompletionId::random(),
            user_id: user.id,
            task_id,
            completed_at: Utc::now(),
            metadata: TaskMetadata::new(),
        };

        store
            .record_completion(&completion)
            .await
            .expect("first completion");
        let err = store
            .record_completion(&NewCompletion {
                id: CompletionId::random(),
                ..completion
            })
            .await
            .expect_err("second completion");

        assert_eq!(err, TaskPersistenceError::AlreadyCompleted);
        assert_eq!(store.user(&user.id).map(|u| u.points), Some(50));
    }

    #[tokio::test]
    async fn referrer_is_written_once() {
        let store = InMemoryStore::new();
        let user = register(&store, "ada").await;
        let first = register(&store, "grace").await;
        let second = register(&store, "alan").await;

        assert!(
            store
                .set_referrer_if_unset(&user.id, &first.id)
                .await
                .expect("first link")
        );
        assert!(
            !store
                .set_referrer_if_unset(&user.id, &second.id)
                .await
                .expect("second link")
        );
        assert_eq!(
            store.user(&user.id).and_then(|u| u.referrer_id),
            Some(first.id)
        );
    }
}
