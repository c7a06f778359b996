//! Permission Domain Events

use serde::{Deserialize, Serialize};
use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;

/// Event emitted when a new permission is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub permission_id: String,
    pub name: String,
}

impl_domain_event!(PermissionCreated);

impl PermissionCreated {
    const EVENT_TYPE: &'static str = "admin:permission:created";

    pub fn new(ctx: &ExecutionContext, permission_id: &str, name: &str) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                format!("admin.permission.{}", permission_id),
            ),
            permission_id: permission_id.to_string(),
            name: name.to_string(),
        }
    }
}

/// Event emitted when a permission is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionDeleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub permission_id: String,
    pub name: String,
}

impl_domain_event!(PermissionDeleted);

impl PermissionDeleted {
    const EVENT_TYPE: &'static str = "admin:permission:deleted";

    pub fn new(ctx: &ExecutionContext, permission_id: &str, name: &str) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                format!("admin.permission.{}", permission_id),
            ),
            permission_id: permission_id.to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::DomainEvent;

    #[test]
    fn test_permission_created_event() {
        let ctx = ExecutionContext::create("admin-1");
        let event = PermissionCreated::new(&ctx, "P1", "EDITOR");

        assert_eq!(event.event_type(), "admin:permission:created");
        assert_eq!(event.subject(), "admin.permission.P1");
        assert_eq!(event.name, "EDITOR");
    }
}
