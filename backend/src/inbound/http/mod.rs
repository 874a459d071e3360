//! HTTP inbound adapter exposing REST endpoints.

pub mod auth;
pub mod context;
pub mod error;
pub mod schemas;
pub mod state;
pub mod users;

pub use error::ApiResult;
