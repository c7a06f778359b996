//! Create Group Use Case

use std::sync::Arc;
use serde::{Deserialize, Serialize};

use crate::group::entity::Group;
use crate::group::repository::GroupRepository;
use crate::permission::entity::{is_reserved_name, Permission};
use crate::permission::repository::PermissionRepository;
use crate::usecase::{
    unit_of_work::{HasId, SerializableAggregate},
    ExecutionContext, UnitOfWork, UseCaseError, UseCaseResult,
};
use super::events::GroupCreated;

/// Command for creating a new group.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupCommand {
    /// Group name
    pub name: String,

    /// Free-form notes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    /// Also create (or link) a permission of the same name and grant it
    /// to the new group
    #[serde(default)]
    pub create_permission: bool,
}

impl HasId for Group {
    fn id(&self) -> &str {
        &self.id
    }

    fn collection_name() -> &'static str {
        "groups"
    }
}

/// Use case for creating a new group, optionally with a companion
/// permission of the same name granted to it.
pub struct CreateGroupUseCase<U: UnitOfWork> {
    group_repo: Arc<GroupRepository>,
    permission_repo: Arc<PermissionRepository>,
    unit_of_work: Arc<U>,
}

impl<U: UnitOfWork> CreateGroupUseCase<U> {
    pub fn new(
        group_repo: Arc<GroupRepository>,
        permission_repo: Arc<PermissionRepository>,
        unit_of_work: Arc<U>,
    ) -> Self {
        Self {
            group_repo,
            permission_repo,
            unit_of_work,
        }
    }

    pub async fn execute(
        &self,
        command: CreateGroupCommand,
        ctx: ExecutionContext,
    ) -> UseCaseResult<GroupCreated> {
        let name = command.name.trim().to_string();
        if name.is_empty() {
            return UseCaseResult::failure(UseCaseError::validation(
                "NAME_REQUIRED",
                "Group name is required",
            ));
        }

        // The companion permission would collide with a reserved role token.
        // Rejected outright rather than created with a warning.
        if command.create_permission && is_reserved_name(&name) {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "RESERVED_PERMISSION_NAME",
                format!("'{}' collides with a reserved role name", name),
            ));
        }

        if let Ok(Some(_)) = self.group_repo.find_by_name(&name).await {
            return UseCaseResult::failure(UseCaseError::business_rule(
                "GROUP_NAME_EXISTS",
                format!("A group named '{}' already exists", name),
            ));
        }

        let mut group = Group::new(&name);
        if let Some(notes) = &command.notes {
            group.notes = Some(notes.clone());
        }
        group.created_by = Some(ctx.principal_id.clone());

        if !command.create_permission {
            let event = GroupCreated::new(&ctx, &group.id, &group.name, None);
            return self.unit_of_work.commit(&group, event, &command).await;
        }

        // Reuse an existing permission of the same name, otherwise create one.
        let mut permission = match self.permission_repo.find_by_name(&name).await {
            Ok(Some(existing)) => existing,
            Ok(None) => {
                let mut created = Permission::new(&name);
                created.created_by = Some(ctx.principal_id.clone());
                created
            }
            Err(e) => {
                return UseCaseResult::failure(UseCaseError::commit(format!(
                    "Failed to look up permission: {}",
                    e
                )));
            }
        };

        permission.grant_to_group(&group.id);
        group.grant_permission(&permission.name);

        let event = GroupCreated::new(&ctx, &group.id, &group.name, Some(permission.name.clone()));
        let aggregates: Vec<Box<dyn SerializableAggregate>> =
            vec![Box::new(group), Box::new(permission)];
        self.unit_of_work.commit_all(aggregates, event, &command).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_serialization() {
        let cmd = CreateGroupCommand {
            name: "editors".to_string(),
            notes: Some("newsroom staff".to_string()),
            create_permission: true,
        };

        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("editors"));
        assert!(json.contains("createPermission"));
    }

    #[test]
    fn test_create_permission_defaults_to_false() {
        let cmd: CreateGroupCommand = serde_json::from_str(r#"{"name": "editors"}"#).unwrap();
        assert!(!cmd.create_permission);
    }

    #[test]
    fn test_group_has_id() {
        let group = Group::new("editors");
        assert!(!HasId::id(&group).is_empty());
        assert_eq!(<Group as HasId>::collection_name(), "groups");
    }
}
