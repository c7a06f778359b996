//! Create Permission Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::permission::entity::{is_reserved_name, Permission};
use crate::permission::repository::PermissionRepository;
use crate::usecase::{
    unit_of_work::HasId,
    ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult,
};
use super::events::PermissionCreated;

/// Command for creating a new permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionCommand {
    /// Permission name (normalized to uppercase)
    pub name: String,

    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl HasId for Permission {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "permissions"
    }
}

/// Use case for creating a new permission.
pub struct CreatePermissionUseCase<U: UnitOfWork> {
    permission_repo: Arc<PermissionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreatePermissionUseCase<U> {
    pub fn new(permission_repo: Arc<PermissionRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            permission_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreatePermissionCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PermissionCreated> {
        let name = command.name.trim().to_uppercase();
        if name.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "NAME_REQUIRED",
                "Permission name is required",
            ));
        }

        // USER and ADMIN would collide with the base role tokens.
        if is_reserved_name(&name) {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "RESERVED_PERMISSION_NAME",
                format!("'{}' is a reserved role name", name),
            ));
        }

        if let Ok(Some(_)) = self.permission_repo.find_by_name(&name).await {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "PERMISSION_NAME_EXISTS",
                format!("A permission named '{}' already exists", name),
            ));
        }

        let mut permission = Permission::new(&name);
        if let Some(notes) = &command.notes {
            permission.notes = Some(notes.clone());
        }
        permission.created_by = Some(ctx.principal_id.clone());

        let event = PermissionCreated::new(&ctx, &permission.id, &permission.name);
        self.unit_of_work.commit(&permission, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::unit_of_work::InMemoryUnitOfWork;

    #[test]
    fn test_command_serialization() {
        let cmd = CreatePermissionCommand {
            name: "EDITOR".to_string(),
            notes: None,
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("EDITOR"));
    }

    #[test]
    fn test_permission_has_id() {
        let permission = Permission::new("EDITOR");
        assert!(!HasId::id(&permission).is_empty());
        assert_eq!(<Permission as HasId>::collection_name(), "permissions");
    }

    #[test]
    fn test_reserved_names_rejected_before_any_io() {
        // The reserved-name check fires before the repository is touched,
        // so it is observable without a database.
        for name in ["USER", "user", "Admin", " ADMIN "] {
            assert!(
                is_reserved_name(name),
                "'{}' should be rejected as reserved",
                name
            );
        }
    }

    #[test]
    fn test_in_memory_unit_of_work_records_commits() {
        let uow = InMemoryUnitOfWork::new();
        assert!(uow.committed_events.lock().unwrap().is_empty());
    }
}
