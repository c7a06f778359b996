//! Use Case Errors
//!
//! Categorized error types for use case failures. Each category maps to a
//! fixed HTTP status so the API layer stays consistent.

use serde::{Deserialize, Serialize};

/// Categorized error types for use case failures.
///
/// - `ValidationError` -> 400 Bad Request
/// - `BusinessRuleViolation` -> 409 Conflict
/// - `NotFoundError` -> 404 Not Found
/// - `CommitError` -> 500 Internal Server Error
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UseCaseError {
    /// Input validation failed (missing fields, invalid format).
    ValidationError { code: String, message: String },

    /// Business rule violation (reserved name, duplicate, wrong state).
    BusinessRuleViolation { code: String, message: String },

    /// Entity not found.
    NotFoundError { code: String, message: String },

    /// Transaction commit failed.
    CommitError { code: String, message: String },
}

impl UseCaseError {
    pub fn validation(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn business_rule(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BusinessRuleViolation {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn not_found(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NotFoundError {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn commit(message: impl Into<String>) -> Self {
        Self::CommitError {
            code: "COMMIT_FAILED".to_string(),
            message: message.into(),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::ValidationError { code, .. } => code,
            Self::BusinessRuleViolation { code, .. } => code,
            Self::NotFoundError { code, .. } => code,
            Self::CommitError { code, .. } => code,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::ValidationError { message, .. } => message,
            Self::BusinessRuleViolation { message, .. } => message,
            Self::NotFoundError { message, .. } => message,
            Self::CommitError { message, .. } => message,
        }
    }

    /// Suggested HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::ValidationError { .. } => 400,
            Self::BusinessRuleViolation { .. } => 409,
            Self::NotFoundError { .. } => 404,
            Self::CommitError { .. } => 500,
        }
    }
}

impl std::fmt::Display for UseCaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code(), self.message())
    }
}

impl std::error::Error for UseCaseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error() {
        let err = UseCaseError::validation("NAME_REQUIRED", "Name is required");
        assert_eq!(err.code(), "NAME_REQUIRED");
        assert_eq!(err.message(), "Name is required");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_business_rule_error() {
        let err = UseCaseError::business_rule("RESERVED_NAME", "Name is reserved");
        assert_eq!(err.http_status_code(), 409);
    }

    #[test]
    fn test_not_found_error() {
        let err = UseCaseError::not_found("GROUP_NOT_FOUND", "Group not found");
        assert_eq!(err.http_status_code(), 404);
    }

    #[test]
    fn test_display_includes_code() {
        let err = UseCaseError::commit("session failed");
        assert_eq!(err.to_string(), "[COMMIT_FAILED] session failed");
    }
}
