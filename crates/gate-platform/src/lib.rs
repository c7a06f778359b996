//! Gatehouse Platform
//!
//! Administrative backend providing:
//! - User accounts provisioned from external OAuth sign-ins
//! - Group and permission management with grant/deny semantics
//! - Sign-in role resolution (permission graph -> role tokens)
//! - Session tokens carrying the resolved role set
//! - Audit logging for administrative mutations
//!
//! ## Module Organization (Aggregate-based)
//!
//! Each aggregate contains:
//! - `entity` - Domain entities
//! - `repository` - Data access
//! - `api` - REST endpoints
//! - `operations` - Use case operations (where applicable)

// Core aggregates
pub mod user;
pub mod group;
pub mod permission;

// Authentication & authorization
pub mod auth;
pub mod audit;

// Shared infrastructure
pub mod shared;

// Cross-cutting concerns
pub mod usecase;
pub mod seed;

// Re-export common types from shared
pub use shared::error::{AdminError, Result};
pub use shared::ids::IdGenerator;

// Re-export use case infrastructure
pub use usecase::{
    DomainEvent, ExecutionContext, MongoUnitOfWork, UnitOfWork, UseCaseError, UseCaseResult,
};
// Note: impl_domain_event! macro is exported at crate root via #[macro_export]

// Re-export main entity types for convenience
pub use user::entity::User;
pub use group::entity::Group;
pub use permission::entity::{Permission, RESERVED_NAMES, ROLE_PREFIX};
pub use audit::entity::{AuditAction, AuditLog};
pub use auth::provider::{AuthenticatedUser, OAuthUserProvider, OAuthUserResponse};
pub use auth::role_resolver::{RoleResolver, ROLE_ADMIN, ROLE_USER};
pub use auth::session_service::{SessionClaims, SessionConfig, SessionService};

// Re-export repositories
pub use user::repository::UserRepository;
pub use group::repository::GroupRepository;
pub use permission::repository::PermissionRepository;
pub use audit::repository::AuditLogRepository;

// Re-export services
pub use audit::service::AuditService;

/// Repository re-exports grouped for server wiring
pub mod repository {
    pub use crate::audit::repository::AuditLogRepository;
    pub use crate::group::repository::GroupRepository;
    pub use crate::permission::repository::PermissionRepository;
    pub use crate::user::repository::UserRepository;
}

/// API state and router re-exports grouped for server wiring
pub mod api {
    pub use crate::audit::api::{audit_logs_router, AuditLogsState};
    pub use crate::auth::api::{auth_router, AuthApiState};
    pub use crate::group::api::{groups_router, GroupsState};
    pub use crate::permission::api::{permissions_router, PermissionsState};
    pub use crate::shared::health_api::{health_router, HealthState};
    pub use crate::shared::middleware::{checks, AppState, Authenticated, CurrentUser};
    pub use crate::user::api::{users_router, UsersState};
}

/// Use case re-exports grouped for server wiring
pub mod operations {
    pub use crate::group::operations::{
        CreateGroupCommand, CreateGroupUseCase, DeleteGroupCommand, DeleteGroupUseCase,
        UpdateGroupCommand, UpdateGroupUseCase,
    };
    pub use crate::permission::operations::{
        CreatePermissionCommand, CreatePermissionUseCase, DeletePermissionCommand,
        DeletePermissionUseCase,
    };
}
