//! Use Case Infrastructure
//!
//! Foundational patterns for mutating operations:
//! - `UseCaseResult` - sealed result type for use case outcomes
//! - `UseCaseError` - categorized errors for consistent HTTP mapping
//! - `DomainEvent` - trait for domain events emitted by mutations
//! - `ExecutionContext` - principal and correlation context
//! - `UnitOfWork` - atomic commit of entity + event + audit log

pub mod result;
pub mod error;
pub mod domain_event;
pub mod execution_context;
pub mod unit_of_work;

pub use result::UseCaseResult;
pub use error::UseCaseError;
pub use domain_event::{DomainEvent, EventMetadata};
pub use execution_context::ExecutionContext;
pub use unit_of_work::{MongoUnitOfWork, UnitOfWork};
