//! Users API handlers.
//!
//! ```text
//! POST /users/auth {"username":"ada","password":"s3cret"}
//! GET  /users/leaderboard?limit=10&offset=0
//! GET  /users/{id}/status
//! POST /users/{id}/task/complete {"task_id":"...","metadata":{"k":"v"}}
//! POST /users/{id}/referrer {"referrer_id":"..."}
//! ```

use actix_web::{HttpRequest, get, post, web};
use pagination::{PageQuery, PageWindow};
use tracing::{info, warn};

use crate::domain::ports::{ReferralRequest, TaskCompletionRequest};
use crate::domain::{Error, LoginCredentials, LoginValidationError, RequestContext, TaskId, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedUser, PathSubject};
use crate::inbound::http::error::json_error_handler;
use crate::inbound::http::schemas::{
    AuthRequest, AuthResponse, ErrorBody, LeaderboardEntryBody, ReferrerRequest, StatusBody,
    TaskCompleteRequest, UserStatusBody,
};
use crate::inbound::http::state::HttpState;

/// Register the users routes together with their extractor configuration.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .service(authenticate)
        .service(leaderboard)
        .service(user_status)
        .service(complete_task)
        .service(set_referrer);
}

fn map_login_validation_error(err: &LoginValidationError) -> Error {
    warn!(error = %err, "rejected login payload");
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty"),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty"),
    }
}

/// Authenticate, registering the username on first use.
#[utoipa::path(
    post,
    path = "/users/auth",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Invalid credentials", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "authenticate",
    security([])
)]
#[post("/users/auth")]
pub async fn authenticate(
    state: web::Data<HttpState>,
    ctx: RequestContext,
    payload: web::Json<AuthRequest>,
) -> ApiResult<web::Json<AuthResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner())
        .map_err(|err| map_login_validation_error(&err))?;
    let session = state.login.authenticate(&ctx, &credentials).await?;
    Ok(web::Json(AuthResponse::from(session)))
}

/// Users ordered by points, highest first.
///
/// Invalid `limit` or `offset` values fall back to their defaults instead of
/// failing the request. When a parameter repeats, its first value is used.
#[utoipa::path(
    get,
    path = "/users/leaderboard",
    params(
        ("limit" = Option<i64>, Query, description = "Page size, 1-99; defaults to 10"),
        ("offset" = Option<i64>, Query, description = "Rows to skip; defaults to 0")
    ),
    responses(
        (status = 200, description = "Leaderboard page", body = [LeaderboardEntryBody]),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "leaderboard",
    security(("BearerAuth" = []))
)]
#[get("/users/leaderboard")]
pub async fn leaderboard(
    _user: AuthenticatedUser,
    state: web::Data<HttpState>,
    ctx: RequestContext,
    req: HttpRequest,
) -> ApiResult<web::Json<Vec<LeaderboardEntryBody>>> {
    let pairs = web::Query::<Vec<(String, String)>>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_else(|err| {
            warn!(
                trace_id = %ctx.trace_id(),
                method = ctx.method(),
                path = ctx.path(),
                error = %err,
                "query string ignored"
            );
            Vec::new()
        });
    let resolved = PageWindow::resolve(&PageQuery::from_pairs(pairs));
    for fallback in &resolved.fallbacks {
        warn!(
            trace_id = %ctx.trace_id(),
            method = ctx.method(),
            path = ctx.path(),
            reason = %fallback,
            "paging parameter replaced by default"
        );
    }
    let entries = state.leaderboard.leaderboard(&ctx, resolved.window).await?;
    Ok(web::Json(
        entries.into_iter().map(LeaderboardEntryBody::from).collect(),
    ))
}

/// Profile and completed tasks of the authenticated user.
#[utoipa::path(
    get,
    path = "/users/{id}/status",
    params(("id" = String, Path, description = "User id; must equal the token subject")),
    responses(
        (status = 200, description = "User status", body = UserStatusBody),
        (status = 400, description = "Invalid request", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "userStatus",
    security(("BearerAuth" = []))
)]
#[get("/users/{id}/status")]
pub async fn user_status(
    subject: PathSubject,
    state: web::Data<HttpState>,
    ctx: RequestContext,
) -> ApiResult<web::Json<UserStatusBody>> {
    let status = state.status.status(&ctx, &subject.user_id()).await?;
    Ok(web::Json(UserStatusBody::from(status)))
}

/// Complete a task and collect its reward.
#[utoipa::path(
    post,
    path = "/users/{id}/task/complete",
    params(("id" = String, Path, description = "User id; must equal the token subject")),
    request_body = TaskCompleteRequest,
    responses(
        (status = 200, description = "Task completed", body = StatusBody),
        (status = 400, description = "Invalid request or already completed", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "User or task not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "completeTask",
    security(("BearerAuth" = []))
)]
#[post("/users/{id}/task/complete")]
pub async fn complete_task(
    subject: PathSubject,
    state: web::Data<HttpState>,
    ctx: RequestContext,
    payload: web::Json<TaskCompleteRequest>,
) -> ApiResult<web::Json<StatusBody>> {
    let body = payload.into_inner();
    if body.task_id.is_nil() {
        warn!(
            trace_id = %ctx.trace_id(),
            path = ctx.path(),
            "task id is empty"
        );
        return Err(Error::invalid_request("task_id must not be empty"));
    }
    let request = TaskCompletionRequest {
        user_id: subject.user_id(),
        task_id: TaskId::from_uuid(body.task_id),
        metadata: body.metadata.unwrap_or_default(),
    };
    let completion = state.tasks.complete_task(&ctx, &request).await?;
    info!(
        trace_id = %ctx.trace_id(),
        completion_id = %completion,
        "task completion acknowledged"
    );
    Ok(web::Json(StatusBody::ok()))
}

/// Link the account that referred the authenticated user.
#[utoipa::path(
    post,
    path = "/users/{id}/referrer",
    params(("id" = String, Path, description = "User id; must equal the token subject")),
    request_body = ReferrerRequest,
    responses(
        (status = 200, description = "Referrer set", body = StatusBody),
        (status = 400, description = "Invalid request or referrer already set", body = ErrorBody),
        (status = 401, description = "Unauthorised", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tags = ["users"],
    operation_id = "setReferrer",
    security(("BearerAuth" = []))
)]
#[post("/users/{id}/referrer")]
pub async fn set_referrer(
    subject: PathSubject,
    state: web::Data<HttpState>,
    ctx: RequestContext,
    payload: web::Json<ReferrerRequest>,
) -> ApiResult<web::Json<StatusBody>> {
    let body = payload.into_inner();
    if body.referrer_id.is_nil() {
        warn!(
            trace_id = %ctx.trace_id(),
            path = ctx.path(),
            "referrer id is empty"
        );
        return Err(Error::invalid_request("referrer_id must not be empty"));
    }
    let request = ReferralRequest {
        user_id: subject.user_id(),
        referrer_id: UserId::from_uuid(body.referrer_id),
    };
    state.referrals.set_referrer(&ctx, &request).await?;
    Ok(web::Json(StatusBody::ok()))
}
