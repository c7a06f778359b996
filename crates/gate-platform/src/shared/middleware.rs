//! API Middleware
//!
//! Authentication for Axum handlers. Supports Bearer token (Authorization
//! header) and session cookie authentication.

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, header::COOKIE, request::Parts, HeaderValue, StatusCode},
    response::{IntoResponse, Json, Response},
};
use std::collections::HashSet;
use std::sync::Arc;

use crate::auth::session_service::{extract_bearer_token, SessionService};
use crate::shared::api_common::ApiError;
use crate::shared::error::AdminError;

/// Default session cookie name
const SESSION_COOKIE_NAME: &str = "gate_session";

/// Application state containing shared services
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionService>,
}

/// The signed-in user, as carried by validated session claims.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: String,
    pub name: String,
    pub roles: HashSet<String>,
}

impl CurrentUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role("ADMIN")
    }
}

/// Authenticated user extractor.
/// Validates the session token and exposes the [`CurrentUser`].
pub struct Authenticated(pub CurrentUser);

impl std::ops::Deref for Authenticated {
    type Target = CurrentUser;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Error response for authentication failures
pub struct AuthError {
    pub status: StatusCode,
    pub message: String,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = ApiError {
            error: "UNAUTHORIZED".to_string(),
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

/// Extract the token from the session cookie
fn extract_session_cookie(parts: &Parts) -> Option<String> {
    parts
        .headers
        .get(COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|cookies| {
            cookies
                .split(';')
                .map(|c| c.trim())
                .find(|c| c.starts_with(SESSION_COOKIE_NAME))
                .and_then(|c| c.split('=').nth(1))
                .map(|v| v.to_string())
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // AppState is injected as an extension by the server
        let app_state = parts.extensions.get::<AppState>().ok_or_else(|| AuthError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Session service not configured".to_string(),
        })?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v: &HeaderValue| v.to_str().ok())
            .and_then(extract_bearer_token)
            .map(String::from)
            .or_else(|| extract_session_cookie(parts))
            .ok_or_else(|| AuthError {
                status: StatusCode::UNAUTHORIZED,
                message: "Missing authentication token".to_string(),
            })?;

        let claims = app_state.sessions.validate(&token).map_err(|e| AuthError {
            status: StatusCode::UNAUTHORIZED,
            message: e.to_string(),
        })?;

        Ok(Authenticated(CurrentUser {
            user_id: claims.sub,
            name: claims.name,
            roles: claims.roles.into_iter().collect(),
        }))
    }
}

/// Authorization checks shared by the admin APIs.
pub mod checks {
    use super::*;

    /// Require the ADMIN role.
    pub fn require_admin(user: &CurrentUser) -> Result<(), AdminError> {
        if user.is_admin() {
            Ok(())
        } else {
            Err(AdminError::forbidden("Administrator role required"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_roles(roles: &[&str]) -> CurrentUser {
        CurrentUser {
            user_id: "u1".to_string(),
            name: "Alice".to_string(),
            roles: roles.iter().map(|r| r.to_string()).collect(),
        }
    }

    #[test]
    fn test_admin_check_passes_for_admin() {
        let user = user_with_roles(&["USER", "ADMIN"]);
        assert!(checks::require_admin(&user).is_ok());
    }

    #[test]
    fn test_admin_check_rejects_plain_user() {
        let user = user_with_roles(&["USER", "ROLE_REPORTS"]);
        let err = checks::require_admin(&user).unwrap_err();
        assert!(matches!(err, AdminError::Forbidden { .. }));
    }

    #[test]
    fn test_has_role() {
        let user = user_with_roles(&["USER", "ROLE_EDITOR"]);
        assert!(user.has_role("ROLE_EDITOR"));
        assert!(!user.has_role("ROLE_REPORTS"));
        assert!(!user.is_admin());
    }
}
