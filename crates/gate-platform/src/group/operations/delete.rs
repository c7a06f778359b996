//! Delete Group Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::group::repository::GroupRepository;
use crate::permission::repository::PermissionRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use crate::user::repository::UserRepository;
use super::events::GroupDeleted;

/// Command for deleting a group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteGroupCommand {
    pub group_id: String,
}

/// Use case for deleting a group and detaching it from users and
/// permissions.
pub struct DeleteGroupUseCase<U: UnitOfWork> {
    group_repo: Arc<GroupRepository>,
    user_repo: Arc<UserRepository>,
    permission_repo: Arc<PermissionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> DeleteGroupUseCase<U> {
    pub fn new(
        group_repo: Arc<GroupRepository>,
        user_repo: Arc<UserRepository>,
        permission_repo: Arc<PermissionRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            group_repo,
            user_repo,
            permission_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: DeleteGroupCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<GroupDeleted> {
        let group = match self.group_repo.find_by_id(&command.group_id).await {
            Ok(Some(group)) => group,
            Ok(None) => {
                return UseCaseResult::failure(UseCaseError::not_found(
                    "GROUP_NOT_FOUND",
                    command.group_id.clone(),
                ));
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to load group: {}",
                    e
                )));
            }
        };

        let event = GroupDeleted::new(&ctx, &group.id, &group.name);
        let result = self.unit_of_work.commit_delete(&group, event, &command).await;

        if result.is_success() {
            // Detach memberships and grant index entries. Dangling refs
            // only widen queries, so failures here are logged, not fatal.
            if let Err(e) = self.user_repo.remove_group_refs(&group.id).await {
                warn!(group_id = %group.id, "Failed to detach group from users: {}", e);
            }
            if let Err(e) = self.permission_repo.remove_group_refs(&group.id).await {
                warn!(group_id = %group.id, "Failed to detach group from permissions: {}", e);
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
        let cmd = DeleteGroupCommand {
            group_id: "G1".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("groupId"));
    }
}
