//! Users Admin API
//!
//! REST endpoints for user administration: listing, flags, group
//! membership, and per-user permission grants and denials.

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
use crate::group::repository::GroupRepository;
use crate::permission::repository::PermissionRepository;
use crate::shared::api_common::{PaginatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::AdminError;
use crate::shared::middleware::{checks, Authenticated};
use crate::user::entity::User;
use crate::user::repository::UserRepository;

/// Update user request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    /// Display name override
    pub nickname: Option<String>,

    /// Grant or revoke the administrator flag
    pub is_admin: Option<bool>,

    /// Freeze or unfreeze the account
    pub is_frozen: Option<bool>,
}

/// User response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub resource_owner: String,
    pub resource_owner_id: String,
    pub nickname: String,
    pub contact: Option<String>,
    pub picture: Option<String>,
    pub last_seen: String,
    pub signin_count: i64,
    pub is_admin: bool,
    pub is_frozen: bool,
    pub groups: Vec<String>,
    pub permissions: Vec<String>,
    pub denied_permissions: Vec<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let mut permissions: Vec<String> = user.permissions.into_iter().collect();
        permissions.sort();
        let mut denied_permissions: Vec<String> = user.denied_permissions.into_iter().collect();
        denied_permissions.sort();

        Self {
            id: user.id,
            resource_owner: user.resource_owner,
            resource_owner_id: user.resource_owner_id,
            nickname: user.nickname,
            contact: user.contact,
            picture: user.picture,
            last_seen: user.last_seen.to_rfc3339(),
            signin_count: user.signin_count,
            is_admin: user.is_admin,
            is_frozen: user.is_frozen,
            groups: user.groups,
            permissions,
            denied_permissions,
        }
    }
}

/// Query parameters for the user list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct UsersQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Substring filter over nickname and contact
    pub filter: Option<String>,
}

/// Users service state
#[derive(Clone)]
pub struct UsersState {
    pub user_repo: Arc<UserRepository>,
    pub group_repo: Arc<GroupRepository>,
    pub permission_repo: Arc<PermissionRepository>,
    pub audit: Arc<AuditService>,
}

async fn load_user(state: &UsersState, id: &str) -> Result<User, AdminError> {
    state
        .user_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AdminError::not_found("User", id))
}

/// List users
#[utoipa::path(
    get,
    path = "",
    tag = "users",
    operation_id = "getApiAdminUsers",
    params(UsersQuery),
    responses(
        (status = 200, description = "Paged users", body = PaginatedResponse<UserResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_users(
    State(state): State<UsersState>,
    auth: Authenticated,
    Query(query): Query<UsersQuery>,
) -> Result<Json<PaginatedResponse<UserResponse>>, AdminError> {
    checks::require_admin(&auth.0)?;

    let filter = query.filter.as_deref();
    let users = state
        .user_repo
        .find_page(filter, query.pagination.offset(), query.pagination.limit())
        .await?;
    let total = state.user_repo.count(filter).await?;

    let data: Vec<UserResponse> = users.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.pagination.page(),
        query.pagination.size(),
        total,
    )))
}

/// Get user by id
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "users",
    operation_id = "getApiAdminUsersById",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let user = load_user(&state, &id).await?;
    Ok(Json(user.into()))
}

/// Update user flags and nickname
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "users",
    operation_id = "putApiAdminUsersById",
    params(("id" = String, Path, description = "User id")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let mut user = load_user(&state, &id).await?;

    if let Some(nickname) = req.nickname {
        let nickname = nickname.trim().to_string();
        if nickname.is_empty() {
            return Err(AdminError::validation("Nickname cannot be empty"));
        }
        user.nickname = nickname;
    }
    if let Some(is_admin) = req.is_admin {
        user.set_admin(is_admin);
    }
    if let Some(is_frozen) = req.is_frozen {
        user.set_frozen(is_frozen);
    }

    user.updated_at = chrono::Utc::now();
    state.user_repo.update(&user).await?;

    if let Some(is_admin) = req.is_admin {
        state
            .audit
            .log(&auth.user_id, AuditAction::AdminChanged, "User", &user.id,
                 Some(format!(r#"{{"isAdmin":{}}}"#, is_admin)))
            .await?;
    }
    if let Some(is_frozen) = req.is_frozen {
        state
            .audit
            .log(&auth.user_id, AuditAction::FreezeChanged, "User", &user.id,
                 Some(format!(r#"{{"isFrozen":{}}}"#, is_frozen)))
            .await?;
    }

    Ok(Json(user.into()))
}

/// Delete user
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "users",
    operation_id = "deleteApiAdminUsersById",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User deleted", body = SuccessResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let user = load_user(&state, &id).await?;

    state.user_repo.delete(&user.id).await?;
    state.permission_repo.remove_user_refs(&user.id).await?;

    state
        .audit
        .log(&auth.user_id, AuditAction::Delete, "User", &user.id, None)
        .await?;

    Ok(Json(SuccessResponse::ok()))
}

/// Add user to group
#[utoipa::path(
    post,
    path = "/{id}/groups/{group_id}",
    tag = "users",
    operation_id = "postApiAdminUsersByIdGroupsByGroupId",
    params(
        ("id" = String, Path, description = "User id"),
        ("group_id" = String, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "User added to group", body = UserResponse),
        (status = 404, description = "User or group not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn add_to_group(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<Json<UserResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let mut user = load_user(&state, &id).await?;

    state
        .group_repo
        .find_by_id(&group_id)
        .await?
        .ok_or_else(|| AdminError::not_found("Group", &group_id))?;

    user.join_group(&group_id);
    state.user_repo.update(&user).await?;

    state
        .audit
        .log(&auth.user_id, AuditAction::MemberAdded, "User", &user.id,
             Some(format!(r#"{{"groupId":"{}"}}"#, group_id)))
        .await?;

    Ok(Json(user.into()))
}

/// Remove user from group
#[utoipa::path(
    delete,
    path = "/{id}/groups/{group_id}",
    tag = "users",
    operation_id = "deleteApiAdminUsersByIdGroupsByGroupId",
    params(
        ("id" = String, Path, description = "User id"),
        ("group_id" = String, Path, description = "Group id")
    ),
    responses(
        (status = 200, description = "User removed from group", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_from_group(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, group_id)): Path<(String, String)>,
) -> Result<Json<UserResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let mut user = load_user(&state, &id).await?;

    user.leave_group(&group_id);
    state.user_repo.update(&user).await?;

    state
        .audit
        .log(&auth.user_id, AuditAction::MemberRemoved, "User", &user.id,
             Some(format!(r#"{{"groupId":"{}"}}"#, group_id)))
        .await?;

    Ok(Json(user.into()))
}

/// Grant mutation applied to both the user document and the permission's
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

async fn change_user_grant(
    state: &UsersState,
    auth: &Authenticated,
    user_id: &str,
    permission_name: &str,
    change: GrantChange,
) -> Result<Json<UserResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let mut user = load_user(state, user_id).await?;

    let mut permission = state
        .permission_repo
        .find_by_name(permission_name)
        .await?
        .ok_or_else(|| AdminError::not_found("Permission", permission_name))?;

    match change {
        GrantChange::Grant => {
            user.grant_permission(&permission.name);
            permission.grant_to_user(&user.id);
        }
        GrantChange::Revoke => {
            user.revoke_permission(&permission.name);
            permission.revoke_from_user(&user.id);
        }
        GrantChange::Deny => {
            user.deny_permission(&permission.name);
            permission.deny_to_user(&user.id);
        }
        GrantChange::Undeny => {
            user.undeny_permission(&permission.name);
            permission.undeny_for_user(&user.id);
        }
    }

    state.user_repo.update(&user).await?;
    state.permission_repo.update(&permission).await?;

    state
        .audit
        .log(&auth.user_id, change.audit_action(), "User", &user.id,
             Some(format!(r#"{{"permission":"{}"}}"#, permission.name)))
        .await?;

    Ok(Json(user.into()))
}

/// Grant permission to user
#[utoipa::path(
    post,
    path = "/{id}/permissions/{name}",
    tag = "users",
    operation_id = "postApiAdminUsersByIdPermissionsByName",
    params(
        ("id" = String, Path, description = "User id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Permission granted", body = UserResponse),
        (status = 404, description = "User or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn grant_permission(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<UserResponse>, AdminError> {
    change_user_grant(&state, &auth, &id, &name, GrantChange::Grant).await
}

/// Revoke permission from user
#[utoipa::path(
    delete,
    path = "/{id}/permissions/{name}",
    tag = "users",
    operation_id = "deleteApiAdminUsersByIdPermissionsByName",
    params(
        ("id" = String, Path, description = "User id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Permission revoked", body = UserResponse),
        (status = 404, description = "User or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn revoke_permission(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<UserResponse>, AdminError> {
    change_user_grant(&state, &auth, &id, &name, GrantChange::Revoke).await
}

/// Deny permission to user
#[utoipa::path(
    post,
    path = "/{id}/denied-permissions/{name}",
    tag = "users",
    operation_id = "postApiAdminUsersByIdDeniedPermissionsByName",
    params(
        ("id" = String, Path, description = "User id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Permission denied", body = UserResponse),
        (status = 404, description = "User or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn deny_permission(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<UserResponse>, AdminError> {
    change_user_grant(&state, &auth, &id, &name, GrantChange::Deny).await
}

/// Lift a permission denial from user
#[utoipa::path(
    delete,
    path = "/{id}/denied-permissions/{name}",
    tag = "users",
    operation_id = "deleteApiAdminUsersByIdDeniedPermissionsByName",
    params(
        ("id" = String, Path, description = "User id"),
        ("name" = String, Path, description = "Permission name")
    ),
    responses(
        (status = 200, description = "Denial lifted", body = UserResponse),
        (status = 404, description = "User or permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn undeny_permission(
    State(state): State<UsersState>,
    auth: Authenticated,
    Path((id, name)): Path<(String, String)>,
) -> Result<Json<UserResponse>, AdminError> {
    change_user_grant(&state, &auth, &id, &name, GrantChange::Undeny).await
}

/// Create users router
pub fn users_router(state: UsersState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_users))
        .routes(routes!(get_user, update_user, delete_user))
        .routes(routes!(add_to_group, remove_from_group))
        .routes(routes!(grant_permission, revoke_permission))
        .routes(routes!(deny_permission, undeny_permission))
        .with_state(state)
}
