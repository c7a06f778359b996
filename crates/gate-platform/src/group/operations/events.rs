//! Group Domain Events

use serde::{Deserialize, Serialize};
use crate::impl_domain_event;
use crate::usecase::domain_event::EventMetadata;
use crate::usecase::ExecutionContext;

/// Event emitted when a new group is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupCreated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub group_id: String,
    pub name: String,
    /// Name of the companion permission created or granted alongside
    #[serde(skip_serializing_if = "Option::is_none")]
    pub companion_permission: Option<String>,
}

impl_domain_event!(GroupCreated);

impl GroupCreated {
    const EVENT_TYPE: &'static str = "admin:group:created";

    pub fn new(
        ctx: &ExecutionContext,
        group_id: &str,
        name: &str,
        companion_permission: Option<String>,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                format!("admin.group.{}", group_id),
            ),
            group_id: group_id.to_string(),
            name: name.to_string(),
            companion_permission,
        }
    }
}

/// Event emitted when a group is updated.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupUpdated {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub group_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl_domain_event!(GroupUpdated);

impl GroupUpdated {
    const EVENT_TYPE: &'static str = "admin:group:updated";

    pub fn new(
        ctx: &ExecutionContext,
        group_id: &str,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                format!("admin.group.{}", group_id),
            ),
            group_id: group_id.to_string(),
            name: name.map(String::from),
            notes: notes.map(String::from),
        }
    }
}

/// Event emitted when a group is deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupDeleted {
    #[serde(flatten)]
    pub metadata: EventMetadata,

    pub group_id: String,
    pub name: String,
}

impl_domain_event!(GroupDeleted);

impl GroupDeleted {
    const EVENT_TYPE: &'static str = "admin:group:deleted";

    pub fn new(ctx: &ExecutionContext, group_id: &str, name: &str) -> Self {
        Self {
            metadata: EventMetadata::new(
                ctx,
                Self::EVENT_TYPE,
                format!("admin.group.{}", group_id),
            ),
            group_id: group_id.to_string(),
            name: name.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::DomainEvent;

    #[test]
    fn test_group_created_event() {
        let ctx = ExecutionContext::create("admin-1");
        let event = GroupCreated::new(&ctx, "G1", "editors", Some("EDITORS".to_string()));

        assert_eq!(event.event_type(), "admin:group:created");
        assert_eq!(event.subject(), "admin.group.G1");
        assert_eq!(event.companion_permission.as_deref(), Some("EDITORS"));
    }

    #[test]
    fn test_group_deleted_event() {
        let ctx = ExecutionContext::create("admin-1");
        let event = GroupDeleted::new(&ctx, "G1", "editors");

        assert_eq!(event.event_type(), "admin:group:deleted");
        assert_eq!(event.name, "editors");
    }
}
