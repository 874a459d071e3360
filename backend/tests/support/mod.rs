//! Shared fixtures for integration tests backed by the in-memory store.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use rewards_backend::domain::{Task, TaskId};
use rewards_backend::inbound::http::state::HttpState;
use rewards_backend::outbound::{Argon2CredentialHasher, HmacTokenIssuer};
use rewards_backend::server::{StateDependencies, build_http_state};
use rewards_backend::test_support::{FixedClock, InMemoryStore};
use uuid::Uuid;

const SECRET: &str = "integration-test-secret";

/// Task worth 50 points.
pub const FOLLOW_TASK: Uuid = Uuid::from_u128(0x5f0c_6c3e_7a3b_4c1e_9a51_0d6f_1c2b_8a02);
/// Task worth 100 points.
pub const INVITE_TASK: Uuid = Uuid::from_u128(0x5f0c_6c3e_7a3b_4c1e_9a51_0d6f_1c2b_8a03);

/// Store seeded with [`FOLLOW_TASK`] and [`INVITE_TASK`].
pub fn seeded_store() -> Arc<InMemoryStore> {
    let created_at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
    let task = |id: Uuid, code: &str, reward_points: u32| Task {
        id: TaskId::from_uuid(id),
        code: code.to_owned(),
        description: String::new(),
        reward_points,
        created_at,
    };
    Arc::new(InMemoryStore::with_tasks([
        task(FOLLOW_TASK, "follow_twitter", 50),
        task(INVITE_TASK, "invite_friend", 100),
    ]))
}

/// HTTP state wired to `store` with a cheap Argon2 cost.
pub fn store_backed_state(store: &Arc<InMemoryStore>) -> HttpState {
    let hasher = Argon2CredentialHasher::with_cost(argon2::Params::MIN_M_COST, 1)
        .expect("valid test cost");
    let tokens = HmacTokenIssuer::new(SECRET).expect("non-empty secret");
    let clock = FixedClock::at(Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap());
    build_http_state(StateDependencies {
        users: store.clone(),
        tasks: store.clone(),
        hasher: Arc::new(hasher),
        tokens: Arc::new(tokens),
        clock: Arc::new(clock),
    })
}
