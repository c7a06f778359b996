//! Delete Permission Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::group::repository::GroupRepository;
use crate::permission::repository::PermissionRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::repository::UserRepository;
use super::events::PermissionDeleted;

/// Command for deleting a permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletePermissionCommand {
    pub permission_id: String,
}

/// Use case for deleting a permission and stripping its name from user
/// and group grant/deny sets.
pub struct DeletePermissionUseCase<U: UnitOfWork> {
    permission_repo: Arc<PermissionRepository>,
    user_repo: Arc<UserRepository>,
    group_repo: Arc<GroupRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DeletePermissionUseCase<U> {
    pub fn new(
        permission_repo: Arc<PermissionRepository>,
        user_repo: Arc<UserRepository>,
        group_repo: Arc<GroupRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            permission_repo,
            user_repo,
            group_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: DeletePermissionCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<PermissionDeleted> {
        let permission = match self.permission_repo.find_by_id(&command.permission_id).await {
            Ok(Some(permission)) => permission,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "PERMISSION_NOT_FOUND",
                    command.permission_id.clone(),
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load permission: {}",
                    e
                )));
            }
        };

        let event = PermissionDeleted::new(&ctx, &permission.id, &permission.name);
        let result = self
            .unit_of_work
            .commit_delete(&permission, event, &command)
            .await;

        if result.is_success() {
            // The resolver reads grant sets by name, so a stale name
            // would keep contributing roles after deletion. Strip it.
            if let Err(e) = self.user_repo.remove_permission_refs(&permission.name).await {
                warn!(permission = %permission.name, "Failed to strip permission from users: {}", e);
            }
            if let Err(e) = self.group_repo.remove_permission_refs(&permission.name).await {
                warn!(permission = %permission.name, "Failed to strip permission from groups: {}", e);
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = DeletePermissionCommand {
            permission_id: "P1".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("permissionId"));
    }
}
