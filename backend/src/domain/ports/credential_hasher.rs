//! Port for one-way password hashing.
use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Failures raised while hashing or verifying credentials.
    pub enum CredentialHashError {
        /// The hasher could not produce a hash.
        Hashing { message: String } => "password hashing failed: {message}",
        /// The stored hash could not be parsed.
        MalformedHash { message: String } => "stored password hash is malformed: {message}",
    }
}

/// Irreversible, salted password hashing with adjustable cost.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Hash `password` with a fresh salt.
    async fn hash(&self, password: &str) -> Result<String, CredentialHashError>;

    /// Check `password` against a previously produced hash.
    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError>;
}
