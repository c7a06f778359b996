//! Audit Log Entity
//!
//! Records administrative actions for traceability: who changed which
//! entity, with the full command payload.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use bson::serde_helpers::chrono_datetime_as_bson_datetime;

use crate::shared::ids::IdGenerator;

/// Audit action type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    /// Entity created
    Create,
    /// Entity updated
    Update,
    /// Entity deleted
    Delete,
    /// Sign-in through the OAuth provider
    Login,
    /// Permission granted to a user or group
    PermissionGranted,
    /// Permission grant revoked
    PermissionRevoked,
    /// Permission denied to a user or group
    PermissionDenied,
    /// Permission denial lifted
    PermissionUndenied,
    /// User added to a group
    MemberAdded,
    /// User removed from a group
    MemberRemoved,
    /// Account frozen or unfrozen
    FreezeChanged,
    /// Admin flag changed
    AdminChanged,
}

impl AuditAction {
    /// Operation name recorded in the log entry.
    pub fn operation(&self) -> &'static str {
        match self {
            Self::Create => "Create",
            Self::Update => "Update",
            Self::Delete => "Delete",
            Self::Login => "Login",
            Self::PermissionGranted => "PermissionGranted",
            Self::PermissionRevoked => "PermissionRevoked",
            Self::PermissionDenied => "PermissionDenied",
            Self::PermissionUndenied => "PermissionUndenied",
            Self::MemberAdded => "MemberAdded",
            Self::MemberRemoved => "MemberRemoved",
            Self::FreezeChanged => "FreezeChanged",
            Self::AdminChanged => "AdminChanged",
        }
    }
}

/// Audit log entry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLog {
    #[serde(rename = "_id")]
    pub id: String,

    /// Entity type affected ("User", "Group", "Permission")
    pub entity_type: String,

    /// Entity ID affected
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,

    /// Operation name: the command type or an [`AuditAction`] name
    pub operation: String,

    /// Full operation payload as JSON string
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operation_json: Option<String>,

    /// Principal who performed the action
    #[serde(skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,

    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub performed_at: DateTime<Utc>,
}

impl AuditLog {
    pub fn new(
        entity_type: impl Into<String>,
        entity_id: Option<String>,
        operation: impl Into<String>,
        operation_json: Option<String>,
        principal_id: Option<String>,
    ) -> Self {
        Self {
            id: IdGenerator::generate(),
            entity_type: entity_type.into(),
            entity_id,
            operation: operation.into(),
            operation_json,
            principal_id,
            performed_at: Utc::now(),
        }
    }

    pub fn with_performed_at(mut self, performed_at: DateTime<Utc>) -> Self {
        self.performed_at = performed_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_audit_log() {
        let log = AuditLog::new(
            "Group",
            Some("G1".to_string()),
            AuditAction::Create.operation(),
            Some(r#"{"name":"editors"}"#.to_string()),
            Some("admin-1".to_string()),
        );

        assert_eq!(log.entity_type, "Group");
        assert_eq!(log.operation, "Create");
        assert_eq!(log.principal_id.as_deref(), Some("admin-1"));
        assert!(!log.id.is_empty());
    }

    #[test]
    fn test_with_performed_at() {
        let when = Utc::now() - chrono::Duration::hours(1);
        let log = AuditLog::new("User", None, "Login", None, None).with_performed_at(when);
        assert_eq!(log.performed_at, when);
    }
}
