//! Domain Event Trait
//!
//! Domain events record facts about what happened (past tense): a group was
//! created, a permission deleted. They are persisted alongside the aggregate
//! by the unit of work.
//!
//! # Conventions
//!
//! Event type format: `admin:{aggregate}:{action}`, e.g. `admin:group:created`.
//! Subject format: `admin.{aggregate}.{id}`, e.g. `admin.group.0HZXEQ5Y8JY5Z`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::ids::IdGenerator;
use super::execution_context::ExecutionContext;

/// Base trait for all domain events.
pub trait DomainEvent: Send + Sync {
    /// Unique identifier for this event.
    fn event_id(&self) -> &str;

    /// Event type code: `admin:{aggregate}:{action}`.
    fn event_type(&self) -> &str;

    /// Qualified aggregate identifier: `admin.{aggregate}.{id}`.
    fn subject(&self) -> &str;

    /// When the event occurred.
    fn time(&self) -> DateTime<Utc>;

    /// Correlation id of the request that produced this event.
    fn correlation_id(&self) -> &str;

    /// Principal who initiated the action.
    fn principal_id(&self) -> &str;

    /// Serialize the event payload to JSON.
    fn to_data_json(&self) -> String;
}

/// Common metadata carried by every domain event.
///
/// Event structs embed this (flattened) and delegate the trait methods to
/// it via [`impl_domain_event!`](crate::impl_domain_event).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventMetadata {
    pub event_id: String,
    pub event_type: String,
    pub subject: String,
    pub time: DateTime<Utc>,
    pub correlation_id: String,
    pub principal_id: String,
}

impl EventMetadata {
    /// Build metadata for a new event from the execution context.
    pub fn new(ctx: &ExecutionContext, event_type: &str, subject: String) -> Self {
        Self {
            event_id: IdGenerator::generate(),
            event_type: event_type.to_string(),
            subject,
            time: Utc::now(),
            correlation_id: ctx.correlation_id.clone(),
            principal_id: ctx.principal_id.clone(),
        }
    }
}

/// Implements [`DomainEvent`] by delegating to a `metadata` field.
///
/// ```ignore
/// pub struct GroupCreated {
///     metadata: EventMetadata,
///     pub group_id: String,
/// }
///
/// impl_domain_event!(GroupCreated);
/// ```
#[macro_export]
macro_rules! impl_domain_event {
    ($event_type:ty) => {
        impl $crate::usecase::DomainEvent for $event_type {
            fn event_id(&self) -> &str {
                &self.metadata.event_id
            }

            fn event_type(&self) -> &str {
                &self.metadata.event_type
            }

            fn subject(&self) -> &str {
                &self.metadata.subject
            }

            fn time(&self) -> chrono::DateTime<chrono::Utc> {
                self.metadata.time
            }

            fn correlation_id(&self) -> &str {
                &self.metadata.correlation_id
            }

            fn principal_id(&self) -> &str {
                &self.metadata.principal_id
            }

            fn to_data_json(&self) -> String {
                serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Debug, Clone, Serialize)]
    struct TestEvent {
        metadata: EventMetadata,
        pub payload: String,
    }

    impl_domain_event!(TestEvent);

    #[test]
    fn test_event_metadata() {
        let ctx = ExecutionContext::create("admin-1");
        let event = TestEvent {
            metadata: EventMetadata::new(&ctx, "admin:group:created", "admin.group.G1".to_string()),
            payload: "value".to_string(),
        };

        assert_eq!(event.event_type(), "admin:group:created");
        assert_eq!(event.subject(), "admin.group.G1");
        assert_eq!(event.principal_id(), "admin-1");
        assert_eq!(event.correlation_id(), ctx.correlation_id);
        assert!(!event.event_id().is_empty());
    }

    #[test]
    fn test_to_data_json() {
        let ctx = ExecutionContext::create("admin-1");
        let event = TestEvent {
            metadata: EventMetadata::new(&ctx, "admin:group:created", "admin.group.G1".to_string()),
            payload: "serialize me".to_string(),
        };

        let json = event.to_data_json();
        assert!(json.contains("payload"));
        assert!(json.contains("serialize me"));
    }
}
