//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **persistence**: PostgreSQL-backed repositories using Diesel ORM
//! - **password**: Argon2id credential hashing
//! - **token**: HS256 identity tokens
//!
//! Adapters are thin translators between domain types and
//! infrastructure-specific representations. They contain no business logic.

pub mod password;
pub mod persistence;
pub mod token;

pub use password::Argon2CredentialHasher;
pub use token::HmacTokenIssuer;
