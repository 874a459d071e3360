//! Domain-level error types.
//!
//! These errors are transport agnostic. The HTTP adapter maps each
//! [`ErrorCode`] onto a status code and a JSON envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable machine-readable error code describing the failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// The request is malformed or fails validation.
    InvalidRequest,
    /// The bearer token is missing, invalid, or names another user.
    Unauthorized,
    /// The password does not match the stored credential.
    InvalidCredentials,
    /// No user exists with the given identifier.
    UserNotFound,
    /// No task exists with the given identifier.
    TaskNotFound,
    /// The user already has a referrer.
    ReferrerAlreadySet,
    /// The user already completed the task.
    TaskAlreadyCompleted,
    /// The completion metadata could not be stored.
    TaskMetadataAlreadyExists,
    /// An unexpected error occurred inside the domain or its adapters.
    InternalError,
}

impl ErrorCode {
    /// Message used when an error is built without one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::InvalidRequest => "bad request",
            Self::Unauthorized => "unauthorized",
            Self::InvalidCredentials => "invalid credentials",
            Self::UserNotFound => "user not found",
            Self::TaskNotFound => "task not found",
            Self::ReferrerAlreadySet => "referrer already set",
            Self::TaskAlreadyCompleted => "task already completed",
            Self::TaskMetadataAlreadyExists => "task metadata already exists",
            Self::InternalError => "internal server error",
        }
    }
}

/// Domain error payload.
///
/// ## Invariants
/// - `message` is non-empty once trimmed of whitespace. Blank input is
///   replaced by [`ErrorCode::default_message`].
///
/// # Examples
/// ```
/// use rewards_backend::domain::{Error, ErrorCode};
///
/// let err = Error::task_not_found("task 7 does not exist");
/// assert_eq!(err.code(), ErrorCode::TaskNotFound);
/// assert_eq!(err.message(), "task 7 does not exist");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    code: ErrorCode,
    message: String,
}

impl Error {
    /// Create a new error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.trim().is_empty() {
            code.default_message().to_owned()
        } else {
            message
        };
        Self { code, message }
    }

    /// Create an error carrying the default message for `code`.
    #[must_use]
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_owned(),
        }
    }

    /// Stable machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message returned to adapters.
    #[must_use]
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Convenience constructor for [`ErrorCode::InvalidRequest`].
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidRequest, message)
    }

    /// Convenience constructor for [`ErrorCode::Unauthorized`].
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    /// Convenience constructor for [`ErrorCode::InvalidCredentials`].
    #[must_use]
    pub fn invalid_credentials() -> Self {
        Self::from_code(ErrorCode::InvalidCredentials)
    }

    /// Convenience constructor for [`ErrorCode::UserNotFound`].
    pub fn user_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::UserNotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::TaskNotFound`].
    pub fn task_not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TaskNotFound, message)
    }

    /// Convenience constructor for [`ErrorCode::ReferrerAlreadySet`].
    #[must_use]
    pub fn referrer_already_set() -> Self {
        Self::from_code(ErrorCode::ReferrerAlreadySet)
    }

    /// Convenience constructor for [`ErrorCode::TaskAlreadyCompleted`].
    #[must_use]
    pub fn task_already_completed() -> Self {
        Self::from_code(ErrorCode::TaskAlreadyCompleted)
    }

    /// Convenience constructor for [`ErrorCode::TaskMetadataAlreadyExists`].
    pub fn task_metadata_already_exists(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::TaskMetadataAlreadyExists, message)
    }

    /// Convenience constructor for [`ErrorCode::InternalError`].
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}
