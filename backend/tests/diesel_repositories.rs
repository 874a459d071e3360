//! Diesel repositories against embedded PostgreSQL.
//!
//! Covers the guarantees the services rely on the database for: the
//! completion transaction, the unique completion index, the conditional
//! referrer update and the leaderboard ordering.
//!
//! Tests are synchronous and drive a per-context Tokio runtime, so they must
//! not run inside another runtime.

use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use pagination::PageWindow;
use pg_embedded_setup_unpriv::TemporaryDatabase;
use rewards_backend::domain::ports::{TaskPersistenceError, TaskRepository, UserRepository};
use rewards_backend::domain::{CompletionId, NewCompletion, NewUser, TaskId, User, UserId};
use rewards_backend::outbound::persistence::{
    DbPool, DieselTaskRepository, DieselUserRepository, PoolConfig,
};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

#[path = "support/cluster_skip.rs"]
mod cluster_skip;
#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use cluster_skip::handle_cluster_setup_failure;
use embedded_postgres::{provision_template_database, shared_cluster};

/// Seeded `follow_twitter` task, worth 50 points.
const FOLLOW_TASK: Uuid = Uuid::from_u128(0x5f0c_6c3e_7a3b_4c1e_9a51_0d6f_1c2b_8a02);
/// Seeded `invite_friend` task, worth 100 points.
const INVITE_TASK: Uuid = Uuid::from_u128(0x5f0c_6c3e_7a3b_4c1e_9a51_0d6f_1c2b_8a03);

struct TestContext {
    runtime: Runtime,
    users: DieselUserRepository,
    tasks: DieselTaskRepository,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn register(&self, username: &str, created_at: DateTime<Utc>) -> User {
        let users = self.users.clone();
        let new_user = NewUser {
            id: UserId::random(),
            username: username.to_owned(),
            password_hash: "$argon2id$v=19$m=8,t=1,p=1$c2FsdA$aGFzaA".to_owned(),
            created_at,
        };
        self.runtime
            .block_on(async move { users.create(&new_user).await })
            .expect("user is created")
    }

    fn complete(
        &self,
        user: &UserId,
        task: Uuid,
        metadata: BTreeMap<String, String>,
    ) -> Result<CompletionId, TaskPersistenceError> {
        let tasks = self.tasks.clone();
        let completion = completion(user, task, metadata);
        self.runtime
            .block_on(async move { tasks.record_completion(&completion).await })
    }

    fn points(&self, user: &UserId) -> i64 {
        let users = self.users.clone();
        let id = *user;
        self.runtime
            .block_on(async move { users.find_by_id(&id).await })
            .expect("lookup succeeds")
            .expect("user exists")
            .points
    }

    fn completed_codes(&self, user: &UserId) -> Vec<String> {
        let tasks = self.tasks.clone();
        let id = *user;
        self.runtime
            .block_on(async move { tasks.completed_tasks(&id).await })
            .expect("completed tasks load")
            .into_iter()
            .map(|task| task.code)
            .collect()
    }
}

fn completion(user: &UserId, task: Uuid, metadata: BTreeMap<String, String>) -> NewCompletion {
    NewCompletion {
        id: CompletionId::random(),
        user_id: *user,
        task_id: TaskId::from_uuid(task),
        completed_at: Utc::now(),
        metadata,
    }
}

fn registered_at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 1, 9, minute, 0)
        .single()
        .expect("valid timestamp")
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let cluster = shared_cluster()?;
    let database = provision_template_database(cluster)?;

    let config = PoolConfig::new(database.url().to_string())
        .with_max_size(4)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    Ok(TestContext {
        runtime,
        users: DieselUserRepository::new(pool.clone()),
        tasks: DieselTaskRepository::new(pool),
        _database: database,
    })
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    assert!(
        tokio::runtime::Handle::try_current().is_err(),
        "diesel repository tests drive their own runtime"
    );
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn completion_awards_points_and_stores_metadata(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let user = ctx.register("ada", registered_at(0));
    let metadata = BTreeMap::from([("handle".to_owned(), "@ada".to_owned())]);

    ctx.complete(&user.id, FOLLOW_TASK, metadata.clone())
        .expect("first completion");

    assert_eq!(ctx.points(&user.id), 50);
    let tasks = ctx.tasks.clone();
    let completed = ctx
        .runtime
        .block_on(async move { tasks.completed_tasks(&user.id).await })
        .expect("completed tasks load");
    assert_eq!(completed.len(), 1);
    let first = completed.first().expect("one completion");
    assert_eq!(first.code, "follow_twitter");
    assert_eq!(first.reward_points, 50);
    assert_eq!(first.metadata, metadata);
}

#[rstest]
fn repeated_completion_is_rejected_without_awarding_again(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let user = ctx.register("ada", registered_at(0));

    ctx.complete(&user.id, FOLLOW_TASK, BTreeMap::new())
        .expect("first completion");
    let second = ctx.complete(&user.id, FOLLOW_TASK, BTreeMap::new());

    assert_eq!(second, Err(TaskPersistenceError::AlreadyCompleted));
    assert_eq!(ctx.points(&user.id), 50);
    assert_eq!(ctx.completed_codes(&user.id), ["follow_twitter"]);
}

#[rstest]
fn racing_completions_commit_exactly_once(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let user = ctx.register("racer", registered_at(0));

    let outcomes = ctx.runtime.block_on(async {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tasks = ctx.tasks.clone();
                let completion = completion(&user.id, INVITE_TASK, BTreeMap::new());
                tokio::spawn(async move { tasks.record_completion(&completion).await })
            })
            .collect();
        let mut outcomes = Vec::with_capacity(handles.len());
        for handle in handles {
            outcomes.push(handle.await.expect("completion task joins"));
        }
        outcomes
    });

    let committed = outcomes.iter().filter(|outcome| outcome.is_ok()).count();
    assert_eq!(committed, 1, "outcomes: {outcomes:?}");
    assert!(
        outcomes
            .iter()
            .filter_map(|outcome| outcome.as_ref().err())
            .all(|err| *err == TaskPersistenceError::AlreadyCompleted),
        "outcomes: {outcomes:?}"
    );
    assert_eq!(ctx.points(&user.id), 100);
    assert_eq!(ctx.completed_codes(&user.id), ["invite_friend"]);
}

#[rstest]
fn rejected_metadata_rolls_back_points_and_completion(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let user = ctx.register("ada", registered_at(0));
    // PostgreSQL text columns refuse NUL bytes.
    let metadata = BTreeMap::from([("bad\0key".to_owned(), "value".to_owned())]);

    let err = ctx
        .complete(&user.id, FOLLOW_TASK, metadata)
        .expect_err("metadata insert fails");

    assert!(
        matches!(err, TaskPersistenceError::MetadataRejected { .. }),
        "unexpected error: {err:?}"
    );
    assert_eq!(ctx.points(&user.id), 0);
    assert!(ctx.completed_codes(&user.id).is_empty());

    ctx.complete(&user.id, FOLLOW_TASK, BTreeMap::new())
        .expect("retry after rollback succeeds");
    assert_eq!(ctx.points(&user.id), 50);
}

#[rstest]
fn completion_for_missing_user_is_reported(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };

    let result = ctx.complete(&UserId::random(), FOLLOW_TASK, BTreeMap::new());

    assert_eq!(result, Err(TaskPersistenceError::UserMissing));
}

#[rstest]
fn referrer_is_written_only_while_unset(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let ada = ctx.register("ada", registered_at(0));
    let bob = ctx.register("bob", registered_at(1));
    let carol = ctx.register("carol", registered_at(2));

    let users = ctx.users.clone();
    let (ada_id, bob_id, carol_id) = (ada.id, bob.id, carol.id);
    let (first, second, reloaded) = ctx.runtime.block_on(async move {
        let first = users.set_referrer_if_unset(&ada_id, &bob_id).await;
        let second = users.set_referrer_if_unset(&ada_id, &carol_id).await;
        let reloaded = users.find_by_id(&ada_id).await;
        (first, second, reloaded)
    });

    assert_eq!(first, Ok(true));
    assert_eq!(second, Ok(false));
    let reloaded = reloaded.expect("lookup succeeds").expect("user exists");
    assert_eq!(reloaded.referrer_id, Some(bob_id));
}

#[rstest]
fn long_and_padded_usernames_are_stored_verbatim(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let long_name = "n".repeat(300);
    let long = ctx.register(&long_name, registered_at(0));
    let padded = ctx.register(" ada", registered_at(1));
    let bare = ctx.register("ada", registered_at(2));

    assert_ne!(padded.id, bare.id);
    let users = ctx.users.clone();
    let found = ctx
        .runtime
        .block_on(async move { users.find_by_username(&long_name).await })
        .expect("lookup succeeds")
        .expect("long username stored");
    assert_eq!(found.id, long.id);
}

#[rstest]
fn leaderboard_orders_by_points_then_registration(repo_context: Option<TestContext>) {
    let Some(ctx) = repo_context else {
        return;
    };
    let ada = ctx.register("ada", registered_at(0));
    let bob = ctx.register("bob", registered_at(1));
    ctx.register("carol", registered_at(2));
    let dave = ctx.register("dave", registered_at(3));

    ctx.complete(&bob.id, INVITE_TASK, BTreeMap::new())
        .expect("bob completes invite");
    ctx.complete(&ada.id, FOLLOW_TASK, BTreeMap::new())
        .expect("ada completes follow");
    ctx.complete(&dave.id, FOLLOW_TASK, BTreeMap::new())
        .expect("dave completes follow");

    let page = |limit, offset| {
        let users = ctx.users.clone();
        let window = PageWindow::new(limit, offset).expect("valid window");
        ctx.runtime
            .block_on(async move { users.leaderboard(window).await })
            .expect("leaderboard loads")
            .into_iter()
            .map(|entry| (entry.username, entry.points))
            .collect::<Vec<_>>()
    };

    assert_eq!(
        page(10, 0),
        [
            ("bob".to_owned(), 100),
            ("ada".to_owned(), 50),
            ("dave".to_owned(), 50),
            ("carol".to_owned(), 0),
        ]
    );
    assert_eq!(
        page(2, 1),
        [("ada".to_owned(), 50), ("dave".to_owned(), 50)]
    );
    assert!(page(10, 4).is_empty());
}
