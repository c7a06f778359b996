//! Groups Admin API
//!
//! REST endpoints for group management: CRUD through use cases, member
//! listings, and group-level permission grants and denials.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audit::entity::AuditAction;
use crate::audit::service::AuditService;
use crate::group::entity::Group;
use crate::group::operations::{
    CreateGroupCommand, CreateGroupUseCase, DeleteGroupCommand, DeleteGroupUseCase,
    UpdateGroupCommand, UpdateGroupUseCase,
};
use crate::group::repository::GroupRepository;
use crate::permission::repository::PermissionRepository;
use crate::shared::api_common::{CreatedResponse, PaginatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::AdminError;
use crate::shared::middleware::{checks, Authenticated};
use crate::usecase::{ExecutionContext, MongoUnitOfWork};
use crate::user::api::UserResponse;
use crate::user::repository::UserRepository;

/// Create group request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupRequest {
    /// Group name
    pub name: String,

    /// Free-form notes
    pub notes: Option<String>,

    /// Also create (or link) a permission of the same name
    #[serde(default)]
    pub create_permission: bool,
}

/// Update group request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupRequest {
    pub name: Option<String>,
    pub notes: Option<String>,
}

/// Group response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GroupResponse {
    pub id: String,
    pub name: String,
    pub notes: Option<String>,
    pub permissions: Vec<String>,
    pub denied_permissions: Vec<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Group> for GroupResponse {
    fn from(group: Group) -> Self {
        let mut permissions: Vec<String> = group.permissions.into_iter().collect();
        permissions.sort();
        let mut denied_permissions: Vec<String> = group.denied_permissions.into_iter().collect();
        denied_permissions.sort();

        Self {
            id: group.id,
            name: group.name,
            notes: group.notes,
            permissions,
            denied_permissions,
            created_at: group.created_at.to_rfc3339(),
            updated_at: group.updated_at.to_rfc3339(),
        }
    }
}

/// Query parameters for the group list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct GroupsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Substring filter over name and notes
    pub filter: Option<String>,
}

/// Query parameters for member listings
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct MembersQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Substring filter over nickname and contact
    pub filter: Option<String>,
}

/// Groups service state
#[derive(Clone)]
pub struct GroupsState {
    pub group_repo: Arc<GroupRepository>,
    pub user_repo: Arc<UserRepository>,
    pub permission_repo: Arc<PermissionRepository>,
    pub audit: Arc<AuditService>,
    pub create_group: Arc<CreateGroupUseCase<MongoUnitOfWork>>,
    pub update_group: Arc<UpdateGroupUseCase<MongoUnitOfWork>>,
    pub delete_group: Arc<DeleteGroupUseCase<MongoUnitOfWork>>,
}

async fn load_group(state: &GroupsState, id: &str) -> Result<Group, AdminError> {
    state
        .group_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AdminError::not_found("Group", id))
}

/// List groups
#[utoipa::path(
    get,
    path = "",
    tag = "groups",
    operation_id = "getApiAdminGroups",
    params(GroupsQuery),
    responses(
        (status = 200, description = "Paged groups", body = PaginatedResponse<GroupResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_groups(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Query(query): Query<GroupsQuery>,
) -> Result<Json<PaginatedResponse<GroupResponse>>, AdminError> {
    checks::require_admin(&auth.0)?;

    let filter = query.filter.as_deref();
    let groups = state
        .group_repo
        .find_page(filter, query.pagination.offset(), query.pagination.limit())
        .await?;
    let total = state.group_repo.count(filter).await?;

    let data: Vec<GroupResponse> = groups.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.pagination.page(),
        query.pagination.size(),
        total,
    )))
}

/// Create a new group
#[utoipa::path(
    post,
    path = "",
    tag = "groups",
    operation_id = "postApiAdminGroups",
    request_body = CreateGroupRequest,
    responses(
        (status = 201, description = "Group created", body = CreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate or reserved name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_group(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<CreatedResponse>, AdminError> {
    checks::require_admin(&auth.0)?;

    let command = CreateGroupCommand {
        name: req.name,
        notes: req.notes,
        create_permission: req.create_permission,
    };
    let ctx = ExecutionContext::create(&auth.user_id);

    let event = state.create_group.execute(command, ctx).await.into_result()?;
    Ok(Json(CreatedResponse::new(event.group_id)))
}

/// Get group by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "groups",
    operation_id = "getApiAdminGroupsById",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group found", body = GroupResponse),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_group(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<GroupResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let group = load_group(&state, &id).await?;
    Ok(Json(group.into()))
}

/// Update group name or notes
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "groups",
    operation_id = "putApiAdminGroupsById",
    params(("id" = String, Path, description = "Group id")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 200, description = "Group updated", body = GroupResponse),
        (status = 404, description = "Group not found"),
        (status = 409, description = "Duplicate name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_group(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateGroupRequest>,
) -> Result<Json<GroupResponse>, AdminError> {
    checks::require_admin(&auth.0)?;

    let command = UpdateGroupCommand {
        group_id: id.clone(),
        name: req.name,
        notes: req.notes,
    };
    let ctx = ExecutionContext::create(&auth.user_id);

    state.update_group.execute(command, ctx).await.into_result()?;

    let group = load_group(&state, &id).await?;
    Ok(Json(group.into()))
}

/// Delete group
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "groups",
    operation_id = "deleteApiAdminGroupsById",
    params(("id" = String, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group deleted", body = SuccessResponse),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_group(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AdminError> {
    checks::require_admin(&auth.0)?;

    let command = DeleteGroupCommand { group_id: id };
    let ctx = ExecutionContext::create(&auth.user_id);

    state.delete_group.execute(command, ctx).await.into_result()?;
    Ok(Json(SuccessResponse::ok()))
}

/// List group members
#[utoipa::path(
    get,
    path = "/{id}/members",
    tag = "groups",
    operation_id = "getApiAdminGroupsByIdMembers",
    params(
        ("id" = String, Path, description = "Group id"),
        MembersQuery
    ),
    responses(
        (status = 200, description = "Users in the group", body = PaginatedResponse<UserResponse>),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_members(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AdminError> {
    list_group_users(&state, &auth, &id, query, true).await
}

/// List users outside the group
#[utoipa::path(
    get,
    path = "/{id}/candidates",
    tag = "groups",
    operation_id = "getApiAdminGroupsByIdCandidates",
    params(
        ("id" = String, Path, description = "Group id"),
        MembersQuery
    ),
    responses(
        (status = 200, description = "Users not in the group", body = PaginatedResponse<UserResponse>),
        (status = 404, description = "Group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_candidates(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Query(query): Query<MembersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AdminError> {
    list_group_users(&state, &auth, &id, query, false).await
}

async fn list_group_users(
    state: &GroupsState,
    auth: &Authenticated,
    group_id: &str,
    query: MembersQuery,
    member: bool,
) -> Result<Json<PaginatedResponse<UserResponse>>, AdminError> {
    checks::require_admin(&auth.0)?;
    load_group(state, group_id).await?;

    let filter = query.filter.as_deref();
    let users = state
        .user_repo
        .find_by_group(
            group_id,
            member,
            filter,
            query.pagination.offset(),
            query.pagination.limit(),
        )
        .await?;
    let total = state.user_repo.count_by_group(group_id, member, filter).await?;

    let data: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.pagination.page(),
        query.pagination.size(),
        total,
    )))
}

/// Grant mutation applied to both the group document and the permission's
/// reverse index.
#[derive(Clone, Copy)]
enum GrantChange {
    Grant,
    Revoke,
    Deny,
    Undeny,
}

impl GrantChange {
    fn audit_action(self) -> AuditAction {
        match self {
            Self::Grant => AuditAction::PermissionGranted,
            Self::Revoke => AuditAction::PermissionRevoked,
            Self::Deny => AuditAction::PermissionDenied,
            Self::Undeny => AuditAction::PermissionUndenied,
        }
    }
}

async fn change_group_grant(
    state: &GroupsState,
    auth: &Authenticated,
    group_id: &str,
    permission_name: &str,
    change: GrantChange,
) -> Result<Json<GroupResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let mut group = load_group(state, group_id).await?;

    let mut permission = state
        .permission_repo
        .find_by_name(permission_name)
        .await?
        .ok_or_else(|| AdminError::not_found("Permission", permission_name))?;

    match change {
        GrantChange::Grant => {
            group.grant_permission(&permission.name);
            permission.grant_to_group(&group.id);
        }
        GrantChange::Revoke => {
            group.revoke_permission(&permission.name);
            permission.revoke_from_group(&group.id);
        }
        GrantChange::Deny => {
            group.deny_permission(&permission.name);
            permission.deny_to_group(&group.id);
        }
        GrantChange::Undeny => {
            group.undeny_permission(&permission.name);
            permission.undeny_for_group(&group.id);
        }
    }

    state.group_repo.update(&group).await?;
    state.permission_repo.update(&permission).await?;

    state
        .audit
        .log(&auth.user_id, change.audit_action(), "Group", &group.id,
             Some(format!(r#"{{"permission":"{}"}}"#, permission.name)))
        .await?;

    Ok(Json(group.into()))
}

/// Grant permission to group
#[utoipa::path(
    post,
    path = "/{id}/permissions/{name}",
    tag = "groups",
    operation_id = "postApiAdminGroupsByIdPermissionsByName",
    params(
        ("id" = String, Path, description = "Group id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Permission granted", body = GroupResponse),
        (status = 404, description = "Group or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn grant_permission(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<GroupResponse>, AdminError> {
    change_group_grant(&state, &auth, &id, &name, GrantChange::Grant).await
}

/// Revoke permission from group
#[utoipa::path(
    delete,
    path = "/{id}/permissions/{name}",
    tag = "groups",
    operation_id = "deleteApiAdminGroupsByIdPermissionsByName",
    params(
        ("id" = String, Path, description = "Group id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Permission revoked", body = GroupResponse),
        (status = 404, description = "Group or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_permission(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<GroupResponse>, AdminError> {
    change_group_grant(&state, &auth, &id, &name, GrantChange::Revoke).await
}

/// Deny permission to group
#[utoipa::path(
    post,
    path = "/{id}/denied-permissions/{name}",
    tag = "groups",
    operation_id = "postApiAdminGroupsByIdDeniedPermissionsByName",
    params(
        ("id" = String, Path, description = "Group id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Permission denied", body = GroupResponse),
        (status = 404, description = "Group or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deny_permission(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<GroupResponse>, AdminError> {
    change_group_grant(&state, &auth, &id, &name, GrantChange::Deny).await
}

/// Lift a permission denial from group
#[utoipa::path(
    delete,
    path = "/{id}/denied-permissions/{name}",
    tag = "groups",
    operation_id = "deleteApiAdminGroupsByIdDeniedPermissionsByName",
    params(
        ("id" = String, Path, description = "Group id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Denial lifted", body = GroupResponse),
        (status = 404, description = "Group or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn undeny_permission(
    State(state): State<GroupsState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<GroupResponse>, AdminError> {
    change_group_grant(&state, &auth, &id, &name, GrantChange::Undeny).await
}

/// Create groups router
pub fn groups_router(state: GroupsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_group, list_groups))
        .routes(routes!(get_group, update_group, delete_group))
        .routes(routes!(list_members))
        .routes(routes!(list_candidates))
        .routes(routes!(grant_permission, revoke_permission))
        .routes(routes!(deny_permission, undeny_permission))
        .with_state(state)
}
