//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent `{"errors": "..."}`
//! responses and status codes.

use actix_web::error::JsonPayloadError;
use actix_web::{HttpRequest, HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode};

use super::schemas::ErrorBody;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::UserNotFound | ErrorCode::TaskNotFound => StatusCode::NOT_FOUND,
        ErrorCode::InvalidCredentials | ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::ReferrerAlreadySet
        | ErrorCode::TaskAlreadyCompleted
        | ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
        ErrorCode::TaskMetadataAlreadyExists | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Message safe to show to clients; server-side failures are redacted.
fn public_message(error: &Error) -> &str {
    if status_for(error.code()).is_server_error() {
        ErrorCode::InternalError.default_message()
    } else {
        error.message()
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(code = ?self.code(), message = self.message(), "request failed");
        }
        HttpResponse::build(status).json(ErrorBody {
            errors: public_message(self).to_owned(),
        })
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Self::internal(err.to_string())
    }
}

/// Map malformed JSON bodies onto `400` with the standard error envelope.
#[expect(
    clippy::needless_pass_by_value,
    reason = "signature is fixed by actix_web::web::JsonConfig::error_handler"
)]
pub fn json_error_handler(err: JsonPayloadError, req: &HttpRequest) -> actix_web::Error {
    warn!(error = %err, path = req.path(), "rejected request body");
    Error::invalid_request(format!("invalid request body: {err}")).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::Value;

    #[rstest]
    #[case(Error::user_not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::task_not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::invalid_credentials(), StatusCode::UNAUTHORIZED)]
    #[case(Error::unauthorized("no token"), StatusCode::UNAUTHORIZED)]
    #[case(Error::referrer_already_set(), StatusCode::BAD_REQUEST)]
    #[case(Error::task_already_completed(), StatusCode::BAD_REQUEST)]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(
        Error::task_metadata_already_exists("dup"),
        StatusCode::INTERNAL_SERVER_ERROR
    )]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_codes_to_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        assert_eq!(error.status_code(), expected);
    }

    async fn body_of(error: &Error) -> Value {
        let bytes = to_bytes(error.error_response().into_body())
            .await
            .expect("body bytes");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[actix_web::test]
    async fn client_errors_expose_their_message() {
        let body = body_of(&Error::task_already_completed()).await;
        assert_eq!(
            body.get("errors").and_then(Value::as_str),
            Some("task already completed")
        );
    }

    #[actix_web::test]
    async fn server_errors_are_redacted() {
        let body = body_of(&Error::task_metadata_already_exists("duplicate key")).await;
        assert_eq!(
            body.get("errors").and_then(Value::as_str),
            Some("internal server error")
        );
    }

    #[actix_web::test]
    async fn actix_errors_become_internal() {
        let actix_err = actix_web::error::ErrorBadRequest("bad");
        let err: Error = actix_err.into();
        assert_eq!(err.code(), ErrorCode::InternalError);
    }
}
