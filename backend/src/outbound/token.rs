//! HS256 JSON Web Token implementation of the `TokenIssuer` port.
//!
//! Tokens carry a single `user_id` claim and never expire. Verification
//! accepts only `HS256` headers.

use std::fmt;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::UserId;
use crate::domain::ports::{TokenError, TokenIssuer};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    user_id: UserId,
}

/// Signs tokens with a shared HMAC-SHA256 secret.
#[derive(Clone)]
pub struct HmacTokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for HmacTokenIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacTokenIssuer")
            .field("secret", &"<redacted>")
            .field("algorithm", &ALGORITHM)
            .finish()
    }
}

impl HmacTokenIssuer {
    /// Build an issuer from the signing secret.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] when the secret is empty.
    pub fn new(secret: impl AsRef<[u8]>) -> Result<Self, TokenError> {
        let bytes = secret.as_ref();
        if bytes.is_empty() {
            return Err(TokenError::signing("signing secret must not be empty"));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;

        Ok(Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            validation,
        })
    }
}

fn map_decode_error(err: jsonwebtoken::errors::Error) -> TokenError {
    match err.kind() {
        ErrorKind::InvalidSignature => TokenError::invalid_signature(),
        _ => TokenError::malformed(err.to_string()),
    }
}

impl TokenIssuer for HmacTokenIssuer {
    fn issue(&self, user: &UserId) -> Result<String, TokenError> {
        jsonwebtoken::encode(
            &Header::new(ALGORITHM),
            &Claims { user_id: *user },
            &self.encoding,
        )
        .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, TokenError> {
        if token.split('.').count() != 3 {
            return Err(TokenError::malformed("expected three dot-separated segments"));
        }

        let header = jsonwebtoken::decode_header(token).map_err(map_decode_error)?;
        if header.alg != ALGORITHM {
            return Err(TokenError::unsupported_algorithm(format!("{:?}", header.alg)));
        }

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims.user_id)
            .map_err(map_decode_error)
    }
}
