//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] collects the `/users` endpoints and their request and response
//! bodies. Protected endpoints reference the `BearerAuth` scheme, which the
//! [`SecurityAddon`] modifier registers as an HTTP bearer token.
//!
//! The generated document backs Swagger UI (debug builds) and is exported via
//! `cargo run --bin openapi-dump` for external tooling.

use crate::inbound::http::schemas::{
    AuthRequest, AuthResponse, CompletedTaskBody, ErrorBody, LeaderboardEntryBody,
    ReferrerRequest, StatusBody, TaskCompleteRequest, UserStatusBody,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer token security scheme.
pub const BEARER_SCHEME: &str = "BearerAuth";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by POST /users/auth."))
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
/// Swagger UI is enabled in debug builds only and used by tooling.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Rewards backend API",
        description = "Task completion, referral and leaderboard endpoints for gamified user rewards."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::users::authenticate,
        crate::inbound::http::users::leaderboard,
        crate::inbound::http::users::user_status,
        crate::inbound::http::users::complete_task,
        crate::inbound::http::users::set_referrer,
    ),
    components(schemas(
        AuthRequest,
        AuthResponse,
        CompletedTaskBody,
        ErrorBody,
        LeaderboardEntryBody,
        ReferrerRequest,
        StatusBody,
        TaskCompleteRequest,
        UserStatusBody,
    )),
    tags(
        (name = "users", description = "Authentication, task progress and referrals")
    )
)]
pub struct ApiDoc;
