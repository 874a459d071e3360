//! Builders wiring driven adapters into the HTTP state.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{CredentialHasher, TaskRepository, TokenIssuer, UserRepository};
use crate::domain::{AuthService, ReferralService, TaskCompletionService, UserQueryService};
use crate::inbound::http::state::HttpState;

/// Driven adapters required by the HTTP state.
pub struct StateDependencies<U, T, H, K> {
    /// User persistence.
    pub users: Arc<U>,
    /// Task catalogue and completion persistence.
    pub tasks: Arc<T>,
    /// Password hashing.
    pub hasher: Arc<H>,
    /// Token signing and verification.
    pub tokens: Arc<K>,
    /// Time source for registration and completion timestamps.
    pub clock: Arc<dyn Clock>,
}

/// Build the HTTP state from driven adapters.
///
/// Every driving port is backed by a domain service sharing the same
/// repositories, so the Diesel adapters and the in-memory store are
/// interchangeable here.
pub fn build_http_state<U, T, H, K>(deps: StateDependencies<U, T, H, K>) -> HttpState
where
    U: UserRepository + 'static,
    T: TaskRepository + 'static,
    H: CredentialHasher + 'static,
    K: TokenIssuer + 'static,
{
    let StateDependencies {
        users,
        tasks,
        hasher,
        tokens,
        clock,
    } = deps;

    let login = AuthService::new(users.clone(), hasher, tokens.clone(), clock.clone());
    let completion = TaskCompletionService::new(users.clone(), tasks.clone(), clock);
    let referrals = ReferralService::new(users.clone());
    let queries = Arc::new(UserQueryService::new(users, tasks));

    HttpState {
        login: Arc::new(login),
        tasks: Arc::new(completion),
        referrals: Arc::new(referrals),
        leaderboard: queries.clone(),
        status: queries,
        tokens,
    }
}
