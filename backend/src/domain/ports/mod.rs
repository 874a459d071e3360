//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven ports (`UserRepository`, `TaskRepository`, `CredentialHasher`,
//! `TokenIssuer`) describe what the domain needs from infrastructure. Driving
//! ports (`LoginService`, `TaskCompletionCommand`, `ReferralCommand`,
//! `LeaderboardQuery`, `UserStatusQuery`) are what inbound adapters call.

mod macros;
pub(crate) use macros::define_port_error;

mod credential_hasher;
mod leaderboard_query;
mod login_service;
mod referral_command;
mod task_completion_command;
mod task_repository;
mod token_issuer;
mod user_repository;
mod user_status_query;

#[cfg(test)]
pub use credential_hasher::MockCredentialHasher;
pub use credential_hasher::{CredentialHashError, CredentialHasher};
pub use leaderboard_query::LeaderboardQuery;
#[cfg(test)]
pub use leaderboard_query::MockLeaderboardQuery;
pub use login_service::LoginService;
#[cfg(test)]
pub use login_service::MockLoginService;
#[cfg(test)]
pub use referral_command::MockReferralCommand;
pub use referral_command::{ReferralCommand, ReferralRequest};
#[cfg(test)]
pub use task_completion_command::MockTaskCompletionCommand;
pub use task_completion_command::{TaskCompletionCommand, TaskCompletionRequest};
#[cfg(test)]
pub use task_repository::MockTaskRepository;
pub use task_repository::{TaskPersistenceError, TaskRepository};
#[cfg(test)]
pub use token_issuer::MockTokenIssuer;
pub use token_issuer::{TokenError, TokenIssuer};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
#[cfg(test)]
pub use user_status_query::MockUserStatusQuery;
pub use user_status_query::UserStatusQuery;
