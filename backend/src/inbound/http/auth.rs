//! Bearer-token extractors used by protected handlers.
//!
//! Keep the HTTP modules focused on request/response mapping by concentrating
//! token checks and subject derivation here. Both extractors fail with the
//! domain [`Error`] so rejections share the JSON error envelope.

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};
use futures_util::future::{Ready, ready};
use tracing::warn;

use crate::domain::{Error, UserId};

use super::state::HttpState;

const BEARER_PREFIX: &str = "Bearer ";

/// Subject of a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser(UserId);

impl AuthenticatedUser {
    /// Identifier carried by the token.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }
}

/// Subject of a verified bearer token that also matches the `{id}` path
/// segment.
///
/// A path id that differs from the subject is rejected with `401`; a path id
/// equal to the subject that is not a UUID is rejected with `400`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathSubject(UserId);

impl PathSubject {
    /// Identifier shared by the token and the path.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.0
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, Error> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            warn!(path = req.path(), "missing bearer token");
            Error::unauthorized("missing bearer token")
        })
}

fn authenticate(req: &HttpRequest) -> Result<UserId, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .ok_or_else(|| Error::internal("HTTP state is not registered"))?;
    let token = bearer_token(req)?;
    state.tokens.verify(token).map_err(|err| {
        warn!(error = %err, path = req.path(), "bearer token rejected");
        Error::unauthorized("invalid bearer token")
    })
}

fn match_path_subject(subject: UserId, raw: &str) -> Result<UserId, Error> {
    if raw != subject.to_string() {
        warn!(path_id = raw, token_id = %subject, "path user does not match token subject");
        return Err(Error::unauthorized("token does not grant access to this user"));
    }
    UserId::new(raw).map_err(|err| {
        warn!(path_id = raw, error = %err, "invalid user id in path");
        Error::invalid_request(format!("invalid user id: {err}"))
    })
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(authenticate(req).map(Self))
    }
}

impl FromRequest for PathSubject {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req).and_then(|subject| {
            let raw = req.match_info().get("id").unwrap_or_default();
            match_path_subject(subject, raw)
        });
        ready(result.map(Self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use rstest::rstest;

    #[rstest]
    fn matching_path_yields_the_subject() {
        let subject = UserId::random();
        assert_eq!(
            match_path_subject(subject, &subject.to_string()),
            Ok(subject)
        );
    }

    #[rstest]
    #[case("not-a-uuid")]
    #[case("")]
    fn other_paths_are_unauthorised(#[case] raw: &str) {
        let err = match_path_subject(UserId::random(), raw).expect_err("mismatch");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    fn other_users_are_unauthorised() {
        let err = match_path_subject(UserId::random(), &UserId::random().to_string())
            .expect_err("mismatch");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }

    #[rstest]
    #[case("Bearer abc", Some("abc"))]
    #[case("Bearer   ", None)]
    #[case("Basic abc", None)]
    #[case("bearer abc", None)]
    fn parses_bearer_headers(#[case] header: &str, #[case] expected: Option<&str>) {
        let req = actix_web::test::TestRequest::get()
            .insert_header((AUTHORIZATION, header))
            .to_http_request();
        assert_eq!(bearer_token(&req).ok(), expected);
    }
}
