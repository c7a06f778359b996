//! Authentication API
//!
//! Sign-in callback consumed by the OAuth gateway after a successful
//! external authentication, plus session introspection.

use axum::{extract::State, Json};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::ToSchema;
use serde::Serialize;
use std::sync::Arc;

use crate::audit::entity::AuditAction;
use crate::audit::service::AuditService;
use crate::auth::provider::{OAuthUserProvider, OAuthUserResponse};
use crate::auth::session_service::SessionService;
use crate::shared::error::AdminError;
use crate::shared::middleware::Authenticated;

/// Sign-in response: session token plus the resolved session context
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SigninResponse {
    pub token: String,
    pub user_id: String,
    pub nickname: String,
    pub signin_count: i64,
    pub roles: Vec<String>,
}

/// Current session response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MeResponse {
    pub user_id: String,
    pub name: String,
    pub roles: Vec<String>,
}

/// Auth service state
#[derive(Clone)]
pub struct AuthApiState {
    pub provider: Arc<OAuthUserProvider>,
    pub sessions: Arc<SessionService>,
    pub audit: Arc<AuditService>,
}

/// Complete an external sign-in
///
/// Accepts the verified identity-provider response, provisions or updates
/// the user, resolves roles, and issues a session token.
#[utoipa::path(
    post,
    path = "/signin",
    tag = "auth",
    operation_id = "postApiAuthSignin",
    request_body = OAuthUserResponse,
    responses(
        (status = 200, description = "Signed in", body = SigninResponse),
        (status = 401, description = "Registration restricted")
    )
)]
pub async fn signin(
    State(state): State<AuthApiState>,
    Json(response): Json<OAuthUserResponse>,
) -> Result<Json<SigninResponse>, AdminError> {
    let authenticated = state.provider.authenticate(&response).await?;
    let token = state.sessions.issue(&authenticated)?;

    state
        .audit
        .log_best_effort(
            &authenticated.user.id,
            AuditAction::Login,
            "User",
            &authenticated.user.id,
            None,
        )
        .await;

    Ok(Json(SigninResponse {
        token,
        user_id: authenticated.user.id.clone(),
        nickname: authenticated.user.nickname.clone(),
        signin_count: authenticated.user.signin_count,
        roles: authenticated.roles.into_iter().collect(),
    }))
}

/// Current session
#[utoipa::path(
    get,
    path = "/me",
    tag = "auth",
    operation_id = "getApiAuthMe",
    responses(
        (status = 200, description = "Current session", body = MeResponse),
        (status = 401, description = "Not signed in")
    ),
    security(("bearer_auth" = []))
)]
pub async fn me(auth: Authenticated) -> Json<MeResponse> {
    let mut roles: Vec<String> = auth.0.roles.iter().cloned().collect();
    roles.sort();
    Json(MeResponse {
        user_id: auth.0.user_id,
        name: auth.0.name,
        roles,
    })
}

/// Create auth router
pub fn auth_router(state: AuthApiState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(signin))
        .routes(routes!(me))
        .with_state(state)
}
