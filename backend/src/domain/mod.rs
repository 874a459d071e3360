//! Domain primitives, ports, and use-case services.
//!
//! Purpose: keep the consistency rules of the rewards system (one-shot
//! referrals, award-once task completion) independent of HTTP and SQL.
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failures.
//! - User, Task, CompletedTask and friends: domain records.
//! - RequestContext: request-scoped logging fields passed by parameter.
//! - AuthService, TaskCompletionService, ReferralService, UserQueryService:
//!   implementations of the driving ports in [`ports`].

pub mod auth;
pub mod auth_service;
pub mod error;
pub mod ports;
pub mod referral_service;
pub mod request_context;
pub mod task;
pub mod task_completion_service;
pub mod trace_id;
pub mod user;
pub mod user_query_service;

pub use self::auth::{AuthSession, LoginCredentials, LoginValidationError};
pub use self::auth_service::AuthService;
pub use self::error::{Error, ErrorCode};
pub use self::referral_service::ReferralService;
pub use self::request_context::RequestContext;
pub use self::task::{
    CompletedTask, CompletionId, NewCompletion, Task, TaskId, TaskMetadata, TaskValidationError,
};
pub use self::task_completion_service::TaskCompletionService;
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{LeaderboardEntry, NewUser, User, UserId, UserStatus, UserValidationError};
pub use self::user_query_service::UserQueryService;
