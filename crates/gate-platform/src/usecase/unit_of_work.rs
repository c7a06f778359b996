//! Unit of Work
//!
//! Atomic commit of entity state changes, domain events, and audit logs
//! within a single MongoDB transaction.

use async_trait::async_trait;
use mongodb::{
    bson::{doc, to_document, Document},
    Client, Database,
};
use serde::Serialize;
use tracing::{debug, error};

use crate::audit::entity::AuditLog;
use super::domain_event::DomainEvent;
use super::error::UseCaseError;
use super::result::UseCaseResult;

/// Unit of Work for atomic admin mutations.
///
/// **This is the ONLY way to create a successful `UseCaseResult`.**
/// `UseCaseResult::success()` is crate-private, so use cases must go through
/// the unit of work to return success. This guarantees that:
/// - Domain events are always emitted when state changes
/// - Audit logs are always created for operations
/// - Entity state and events are consistent (atomic commit)
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Commit an entity change with its domain event atomically.
    async fn commit<E, T, C>(
        &self,
        aggregate: &T,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync;

    /// Commit a delete operation with its domain event atomically.
    async fn commit_delete<E, T, C>(
        &self,
        aggregate: &T,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync;

    /// Commit multiple entity changes with a single domain event atomically.
    ///
    /// Used for operations that touch more than one aggregate, such as
    /// creating a group together with its companion permission.
    async fn commit_all<E, C>(
        &self,
        aggregates: Vec<Box<dyn SerializableAggregate>>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync;
}

/// Trait for entities that have an ID field.
pub trait HasId {
    fn id(&self) -> &str;
    fn collection_name() -> &'static str;
}

/// Trait for serializable aggregates with collection info.
pub trait SerializableAggregate: Send + Sync {
    fn id(&self) -> &str;
    fn collection_name(&self) -> &str;
    fn to_document(&self) -> Result<Document, mongodb::bson::ser::Error>;
}

impl<T: Serialize + HasId + Send + Sync> SerializableAggregate for T {
    fn id(&self) -> &str {
        HasId::id(self)
    }

    fn collection_name(&self) -> &str {
        T::collection_name()
    }

    fn to_document(&self) -> Result<Document, mongodb::bson::ser::Error> {
        to_document(self)
    }
}

/// MongoDB implementation of UnitOfWork using multi-document transactions.
///
/// Requires MongoDB 4.0+ deployed as a replica set.
#[derive(Clone)]
pub struct MongoUnitOfWork {
    client: Client,
    database: Database,
}

impl MongoUnitOfWork {
    pub fn new(client: Client, database: Database) -> Self {
        Self { client, database }
    }

    /// Extract the aggregate type from a subject string.
    /// `"admin.group.0HZX..."` -> `"Group"`.
    fn aggregate_type(subject: &str) -> String {
        subject
            .split('.')
            .nth(1)
            .map(|s| {
                let mut chars = s.chars();
                match chars.next() {
                    Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
                    None => String::new(),
                }
            })
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Extract the entity id from a subject string.
    fn entity_id(subject: &str) -> Option<String> {
        subject.split('.').nth(2).map(String::from)
    }

    /// Serialize a domain event for the events collection.
    fn event_document<E: DomainEvent + Serialize>(event: &E) -> Result<Document, mongodb::bson::ser::Error> {
        let mut document = to_document(event)?;
        document.insert("_id", event.event_id());
        Ok(document)
    }

    /// Build the audit log entry for a committed command.
    fn audit_log<E: DomainEvent, C: Serialize>(event: &E, command: &C) -> AuditLog {
        let command_name = std::any::type_name::<C>()
            .rsplit("::")
            .next()
            .unwrap_or("Unknown")
            .to_string();

        AuditLog::new(
            Self::aggregate_type(event.subject()),
            Self::entity_id(event.subject()),
            command_name,
            serde_json::to_string(command).ok(),
            Some(event.principal_id().to_string()),
        )
        .with_performed_at(event.time())
    }

    /// Run the shared transaction tail: insert the event and audit log,
    /// then commit.
    async fn finish_transaction<E, C>(
        &self,
        session: &mut mongodb::ClientSession,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        let event_doc = match Self::event_document(&event) {
            Ok(d) => d,
            Err(e) => {
                let _ = session.abort_transaction().await;
                return UseCaseResult::failure(UseCaseError::commit(
                    format!("Failed to serialize event: {}", e),
                ));
            }
        };

        let events = self.database.collection::<Document>("events");
        if let Err(e) = events.insert_one(event_doc).session(&mut *session).await {
            let _ = session.abort_transaction().await;
            error!("Failed to insert event: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to insert event: {}", e),
            ));
        }

        let audit = Self::audit_log(&event, command);
        let audit_logs = self.database.collection::<AuditLog>("audit_logs");
        if let Err(e) = audit_logs.insert_one(&audit).session(&mut *session).await {
            let _ = session.abort_transaction().await;
            error!("Failed to insert audit log: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to insert audit log: {}", e),
            ));
        }

        if let Err(e) = session.commit_transaction().await {
            error!("Failed to commit transaction: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to commit transaction: {}", e),
            ));
        }

        debug!(
            event_id = event.event_id(),
            event_type = event.event_type(),
            "Committed transaction"
        );

        UseCaseResult::success(event)
    }

    async fn begin(&self) -> Result<mongodb::ClientSession, UseCaseError> {
        let mut session = self.client.start_session().await.map_err(|e| {
            error!("Failed to start MongoDB session: {}", e);
            UseCaseError::commit(format!("Failed to start session: {}", e))
        })?;

        session.start_transaction().await.map_err(|e| {
            error!("Failed to start transaction: {}", e);
            UseCaseError::commit(format!("Failed to start transaction: {}", e))
        })?;

        Ok(session)
    }
}

#[async_trait]
impl UnitOfWork for MongoUnitOfWork {
    async fn commit<E, T, C>(
        &self,
        aggregate: &T,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync,
    {
        let mut session = match self.begin().await {
            Ok(s) => s,
            Err(e) => return UseCaseResult::failure(e),
        };

        let collection = self.database.collection::<Document>(T::collection_name());
        let aggregate_doc = match to_document(aggregate) {
            Ok(d) => d,
            Err(e) => {
                let _ = session.abort_transaction().await;
                return UseCaseResult::failure(UseCaseError::commit(
                    format!("Failed to serialize aggregate: {}", e),
                ));
            }
        };

        let upsert = collection
            .update_one(
                doc! { "_id": HasId::id(aggregate) },
                doc! { "$set": &aggregate_doc },
            )
            .upsert(true)
            .session(&mut session)
            .await;

        if let Err(e) = upsert {
            let _ = session.abort_transaction().await;
            error!("Failed to persist aggregate: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to persist aggregate: {}", e),
            ));
        }

        self.finish_transaction(&mut session, event, command).await
    }

    async fn commit_delete<E, T, C>(
        &self,
        aggregate: &T,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync,
    {
        let mut session = match self.begin().await {
            Ok(s) => s,
            Err(e) => return UseCaseResult::failure(e),
        };

        let collection = self.database.collection::<Document>(T::collection_name());

        if let Err(e) = collection
            .delete_one(doc! { "_id": HasId::id(aggregate) })
            .session(&mut session)
            .await
        {
            let _ = session.abort_transaction().await;
            error!("Failed to delete aggregate: {}", e);
            return UseCaseResult::failure(UseCaseError::commit(
                format!("Failed to delete aggregate: {}", e),
            ));
        }

        self.finish_transaction(&mut session, event, command).await
    }

    async fn commit_all<E, C>(
        &self,
        aggregates: Vec<Box<dyn SerializableAggregate>>,
        event: E,
        command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        let mut session = match self.begin().await {
            Ok(s) => s,
            Err(e) => return UseCaseResult::failure(e),
        };

        for aggregate in &aggregates {
            let collection = self
                .database
                .collection::<Document>(aggregate.collection_name());

            let aggregate_doc = match aggregate.to_document() {
                Ok(d) => d,
                Err(e) => {
                    let _ = session.abort_transaction().await;
                    return UseCaseResult::failure(UseCaseError::commit(
                        format!("Failed to serialize aggregate: {}", e),
                    ));
                }
            };

            let upsert = collection
                .update_one(
                    doc! { "_id": aggregate.id() },
                    doc! { "$set": &aggregate_doc },
                )
                .upsert(true)
                .session(&mut session)
                .await;

            if let Err(e) = upsert {
                let _ = session.abort_transaction().await;
                error!("Failed to persist aggregate: {}", e);
                return UseCaseResult::failure(UseCaseError::commit(
                    format!("Failed to persist aggregate: {}", e),
                ));
            }
        }

        self.finish_transaction(&mut session, event, command).await
    }
}

/// In-memory UnitOfWork for testing.
#[cfg(test)]
pub struct InMemoryUnitOfWork {
    pub committed_events: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl InMemoryUnitOfWork {
    pub fn new() -> Self {
        Self {
            committed_events: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl UnitOfWork for InMemoryUnitOfWork {
    async fn commit<E, T, C>(
        &self,
        _aggregate: &T,
        event: E,
        _command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync,
    {
        self.committed_events
            .lock()
            .unwrap()
            .push(event.event_id().to_string());
        UseCaseResult::success(event)
    }

    async fn commit_delete<E, T, C>(
        &self,
        _aggregate: &T,
        event: E,
        _command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        T: Serialize + HasId + Send + Sync,
        C: Serialize + Send + Sync,
    {
        self.committed_events
            .lock()
            .unwrap()
            .push(event.event_id().to_string());
        UseCaseResult::success(event)
    }

    async fn commit_all<E, C>(
        &self,
        _aggregates: Vec<Box<dyn SerializableAggregate>>,
        event: E,
        _command: &C,
    ) -> UseCaseResult<E>
    where
        E: DomainEvent + Serialize + Send + 'static,
        C: Serialize + Send + Sync,
    {
        self.committed_events
            .lock()
            .unwrap()
            .push(event.event_id().to_string());
        UseCaseResult::success(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aggregate_type() {
        assert_eq!(MongoUnitOfWork::aggregate_type("admin.group.123"), "Group");
        assert_eq!(MongoUnitOfWork::aggregate_type("admin.permission.abc"), "Permission");
        assert_eq!(MongoUnitOfWork::aggregate_type(""), "Unknown");
    }

    #[test]
    fn test_entity_id() {
        assert_eq!(
            MongoUnitOfWork::entity_id("admin.user.123"),
            Some("123".to_string())
        );
        assert_eq!(MongoUnitOfWork::entity_id("admin.user"), None);
    }
}
