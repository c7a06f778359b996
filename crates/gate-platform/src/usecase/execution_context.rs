//! Execution Context
//!
//! Carries the acting principal and a correlation id through a use case
//! execution; domain event metadata is populated from it.

use chrono::{DateTime, Utc};
use crate::shared::ids::IdGenerator;

/// Context for a use case execution.
#[derive(Debug, Clone)]
pub struct ExecutionContext {
    /// Id for tracing a request through its events and audit entries.
    pub correlation_id: String,
    /// Id of the principal performing the action.
    pub principal_id: String,
    /// When the execution was initiated.
    pub initiated_at: DateTime<Utc>,
}

impl ExecutionContext {
    /// Create a context for a fresh request with a generated correlation id.
    pub fn create(principal_id: impl Into<String>) -> Self {
        Self {
            correlation_id: format!("req-{}", IdGenerator::generate()),
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }

    /// Create a context with a correlation id supplied by an upstream
    /// request header.
    pub fn with_correlation(
        principal_id: impl Into<String>,
        correlation_id: impl Into<String>,
    ) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            principal_id: principal_id.into(),
            initiated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_context() {
        let ctx = ExecutionContext::create("user-123");
        assert!(ctx.correlation_id.starts_with("req-"));
        assert_eq!(ctx.principal_id, "user-123");
    }

    #[test]
    fn test_with_correlation() {
        let ctx = ExecutionContext::with_correlation("user-123", "corr-456");
        assert_eq!(ctx.correlation_id, "corr-456");
        assert_eq!(ctx.principal_id, "user-123");
    }
}
