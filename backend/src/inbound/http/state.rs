//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    LeaderboardQuery, LoginService, ReferralCommand, TaskCompletionCommand, TokenIssuer,
    UserStatusQuery,
};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication and first-login registration.
    pub login: Arc<dyn LoginService>,
    /// Task completion use-case.
    pub tasks: Arc<dyn TaskCompletionCommand>,
    /// Referrer linking use-case.
    pub referrals: Arc<dyn ReferralCommand>,
    /// Leaderboard read model.
    pub leaderboard: Arc<dyn LeaderboardQuery>,
    /// Per-user status read model.
    pub status: Arc<dyn UserStatusQuery>,
    /// Verifies bearer tokens for protected routes.
    pub tokens: Arc<dyn TokenIssuer>,
}
