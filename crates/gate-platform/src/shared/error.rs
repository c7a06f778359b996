//! Platform Error Types

use thiserror::Error;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use utoipa::ToSchema;

use crate::usecase::UseCaseError;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Duplicate entity: {entity_type} with {field}={value}")]
    Duplicate { entity_type: String, field: String, value: String },

    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Permission name '{name}' is reserved")]
    ReservedName { name: String },

    #[error("Registration is restricted: {email} does not match the allowed pattern")]
    RegistrationRestricted { email: String },

    #[error("Authorization error: {message}")]
    Unauthorized { message: String },

    #[error("Forbidden: {message}")]
    Forbidden { message: String },

    #[error("Invalid token: {message}")]
    InvalidToken { message: String },

    #[error("Token expired")]
    TokenExpired,

    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AdminError {
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: impl Into<String>, field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn reserved_name(name: impl Into<String>) -> Self {
        Self::ReservedName { name: name.into() }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized { message: message.into() }
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden { message: message.into() }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal { message: message.into() }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;

/// Check whether a MongoDB error is a unique-index violation.
///
/// Insert races (two first-time logins for the same identity) surface as
/// duplicate-key write errors; callers map them to [`AdminError::Duplicate`].
pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    use mongodb::error::{ErrorKind, WriteFailure};
    matches!(
        err.kind.as_ref(),
        ErrorKind::Write(WriteFailure::WriteError(write_error)) if write_error.code == 11000
    )
}

/// Error response body
#[derive(Debug, serde::Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl IntoResponse for AdminError {
    fn into_response(self) -> Response {
        let (status, error_type) = match &self {
            AdminError::NotFound { .. } => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AdminError::Duplicate { .. } => (StatusCode::CONFLICT, "DUPLICATE"),
            AdminError::Validation { .. } => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            AdminError::ReservedName { .. } => (StatusCode::CONFLICT, "RESERVED_NAME"),
            AdminError::RegistrationRestricted { .. } => (StatusCode::UNAUTHORIZED, "REGISTRATION_RESTRICTED"),
            AdminError::Unauthorized { .. } => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            AdminError::Forbidden { .. } => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            AdminError::InvalidToken { .. } => (StatusCode::UNAUTHORIZED, "INVALID_TOKEN"),
            AdminError::TokenExpired => (StatusCode::UNAUTHORIZED, "TOKEN_EXPIRED"),
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message: self.to_string(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<UseCaseError> for AdminError {
    fn from(err: UseCaseError) -> Self {
        match err {
            UseCaseError::ValidationError { message, .. } => {
                AdminError::Validation { message }
            }
            UseCaseError::BusinessRuleViolation { message, .. } => {
                AdminError::Duplicate {
                    entity_type: "Entity".to_string(),
                    field: "constraint".to_string(),
                    value: message,
                }
            }
            UseCaseError::NotFoundError { message, .. } => {
                AdminError::NotFound {
                    entity_type: "Entity".to_string(),
                    id: message,
                }
            }
            UseCaseError::CommitError { message, .. } => {
                AdminError::Internal { message }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;

    #[test]
    fn test_not_found_maps_to_404() {
        let response = AdminError::not_found("User", "abc").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_reserved_name_maps_to_conflict() {
        let response = AdminError::reserved_name("ADMIN").into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_registration_restriction_maps_to_unauthorized() {
        let err = AdminError::RegistrationRestricted { email: "a@other.com".into() };
        assert!(err.to_string().contains("a@other.com"));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_use_case_error_conversion() {
        let err: AdminError = UseCaseError::validation("NAME_REQUIRED", "Name is required").into();
        assert!(matches!(err, AdminError::Validation { .. }));
    }
}
