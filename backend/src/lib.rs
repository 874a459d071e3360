//! Rewards backend library.
//!
//! Users authenticate with a username and password (registering on first
//! use), complete tasks for reward points, name a referrer once and read a
//! points leaderboard. The crate follows a hexagonal layout: `domain` holds
//! the use-cases and ports, `inbound` the HTTP adapter and `outbound` the
//! PostgreSQL, Argon2 and token adapters.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
