//! Argon2id implementation of the `CredentialHasher` port.
//!
//! Hashing is CPU-bound, so both operations run on the blocking thread pool
//! rather than on an actix worker.

use argon2::password_hash::{PasswordHasher, SaltString};
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordVerifier, Version};
use async_trait::async_trait;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::domain::ports::{CredentialHashError, CredentialHasher};

/// Salted Argon2id hasher producing PHC strings.
///
/// Verification reads the cost parameters embedded in the stored hash, so
/// changing the configured cost only affects newly registered users.
#[derive(Debug, Clone, Default)]
pub struct Argon2CredentialHasher {
    params: Params,
}

impl Argon2CredentialHasher {
    /// Hasher using the `argon2` crate's recommended cost.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hasher with explicit memory (KiB) and iteration cost.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialHashError::Hashing`] when the parameters fall
    /// outside the ranges Argon2 accepts.
    pub fn with_cost(memory_kib: u32, iterations: u32) -> Result<Self, CredentialHashError> {
        let params = Params::new(memory_kib, iterations, Params::DEFAULT_P_COST, None)
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?;
        Ok(Self { params })
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

fn hash_blocking(argon2: &Argon2<'_>, password: &str) -> Result<String, CredentialHashError> {
    let salt = SaltString::generate(&mut OsRng);
    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| CredentialHashError::hashing(err.to_string()))
}

fn verify_blocking(
    argon2: &Argon2<'_>,
    password: &str,
    hash: &str,
) -> Result<bool, CredentialHashError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|err| CredentialHashError::malformed_hash(err.to_string()))?;
    match argon2.verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(CredentialHashError::hashing(err.to_string())),
    }
}

#[async_trait]
impl CredentialHasher for Argon2CredentialHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialHashError> {
        let argon2 = self.argon2();
        let password = Zeroizing::new(password.to_owned());
        tokio::task::spawn_blocking(move || hash_blocking(&argon2, &password))
            .await
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?
    }

    async fn verify(&self, password: &str, hash: &str) -> Result<bool, CredentialHashError> {
        let argon2 = self.argon2();
        let password = Zeroizing::new(password.to_owned());
        let hash = hash.to_owned();
        tokio::task::spawn_blocking(move || verify_blocking(&argon2, &password, &hash))
            .await
            .map_err(|err| CredentialHashError::hashing(err.to_string()))?
    }
}
