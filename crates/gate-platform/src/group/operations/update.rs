//! Update Group Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::group::repository::GroupRepository;
use crate::usecase::{ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult};
use super::events::GroupUpdated;

/// Command for updating a group's name or notes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupCommand {
    pub group_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Use case for renaming a group or editing its notes.
pub struct UpdateGroupUseCase<U: UnitOfWork> {
    group_repo: Arc<GroupRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> UpdateGroupUseCase<U> {
    pub fn new(group_repo: Arc<GroupRepository>, unit_of_work: Arc<U>) -> Self {
        Self {
            group_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: UpdateGroupCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<GroupUpdated> {
        let mut group = match self.group_repo.find_by_id(&command.group_id).await {
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

        if let Some(name) = &command.name {
            let name = name.trim();
            if name.is_empty() {
                return UseCaseResult::failure(UseCaseError::validation(
                    "NAME_REQUIRED",
                    "Group name cannot be empty",
                ));
            }

            if let Ok(Some(other)) = self.group_repo.find_by_name(name).await {
                if other.id != group.id {
                    return UseCaseResult::failure(UseCaseError::business_rule(
                        "GROUP_NAME_EXISTS",
                        format!("A group named '{}' already exists", name),
                    ));
                }
            }

            group.name = name.to_string();
        }

        if let Some(notes) = &command.notes {
            group.notes = Some(notes.clone());
        }

        group.updated_at = chrono::Utc::now();

        let event = GroupUpdated::new(
            &ctx,
            &group.id,
            command.name.as_deref(),
            command.notes.as_deref(),
        );
        self.unit_of_work.commit(&group, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = UpdateGroupCommand {
            group_id: "G1".to_string(),
            name: Some("writers".to_string()),
            notes: None,
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("groupId"));
        assert!(json.contains("writers"));
        assert!(!json.contains("notes"));
    }
}
