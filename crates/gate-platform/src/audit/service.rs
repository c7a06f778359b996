//! Audit Service
//!
//! Centralized audit logging for mutations performed outside the unit of
//! work (flag updates, grant/revoke, logins).

use std::sync::Arc;
use tracing::error;

use crate::audit::entity::{AuditAction, AuditLog};
use crate::audit::repository::AuditLogRepository;
use crate::shared::error::Result;

/// Audit service for recording administrative actions
#[derive(Clone)]
pub struct AuditService {
    repo: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(repo: Arc<AuditLogRepository>) -> Self {
        Self { repo }
    }

    /// Record an action against an entity.
    pub async fn log(
        &self,
        principal_id: &str,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        detail: Option<String>,
    ) -> Result<()> {
        let entry = AuditLog::new(
            entity_type,
            Some(entity_id.to_string()),
            action.operation(),
            detail,
            Some(principal_id.to_string()),
        );
        self.repo.insert(&entry).await
    }

    /// Record an action, logging failures instead of propagating them.
    ///
    /// Sign-in flows use this: a failed audit write must not block
    /// authentication.
    pub async fn log_best_effort(
        &self,
        principal_id: &str,
        action: AuditAction,
        entity_type: &str,
        entity_id: &str,
        detail: Option<String>,
    ) {
        if let Err(e) = self
            .log(principal_id, action, entity_type, entity_id, detail)
            .await
        {
            error!(
                principal_id = %principal_id,
                entity_type = %entity_type,
                entity_id = %entity_id,
                "Failed to write audit log: {}", e
            );
        }
    }
}
