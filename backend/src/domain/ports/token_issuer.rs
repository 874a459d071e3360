//! Port for stateless identity tokens.
use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Token signing and verification failures.
    pub enum TokenError {
        /// The token is not a well-formed signed claim set.
        Malformed { message: String } => "malformed token: {message}",
        /// The token header names an algorithm other than the configured one.
        UnsupportedAlgorithm { algorithm: String } => "unsupported token algorithm {algorithm}",
        /// The signature does not match the payload.
        InvalidSignature => "token signature mismatch",
        /// The token could not be produced.
        Signing { message: String } => "token signing failed: {message}",
    }
}

/// Issues and verifies signed tokens whose only claim is the user id.
///
/// Tokens do not expire; a valid signature is proof of identity.
#[cfg_attr(test, mockall::automock)]
pub trait TokenIssuer: Send + Sync {
    /// Sign a token binding `user`.
    fn issue(&self, user: &UserId) -> Result<String, TokenError>;

    /// Verify `token` and return its subject.
    fn verify(&self, token: &str) -> Result<UserId, TokenError>;
}
