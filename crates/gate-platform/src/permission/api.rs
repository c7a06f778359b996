//! Permissions Admin API
//!
//! REST endpoints for the permission catalog and its grant index.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::permission::entity::Permission;
use crate::permission::operations::{
    CreatePermissionCommand, CreatePermissionUseCase, DeletePermissionCommand,
    DeletePermissionUseCase,
};
use crate::permission::repository::PermissionRepository;
use crate::shared::api_common::{CreatedResponse, PaginatedResponse, PaginationParams, SuccessResponse};
use crate::shared::error::AdminError;
use crate::shared::middleware::{checks, Authenticated};
use crate::usecase::{ExecutionContext, MongoUnitOfWork};

/// Create permission request
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePermissionRequest {
    /// Permission name (normalized to uppercase)
    pub name: String,

    /// Free-form notes
    pub notes: Option<String>,
}

/// Permission response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionResponse {
    pub id: String,
    pub name: String,
    pub role_token: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Permission> for PermissionResponse {
    fn from(permission: Permission) -> Self {
        let role_token = permission.role_token();
        Self {
            id: permission.id,
            name: permission.name,
            role_token,
            notes: permission.notes,
            created_at: permission.created_at.to_rfc3339(),
            updated_at: permission.updated_at.to_rfc3339(),
        }
    }
}

/// Grant index for a permission: who holds or is denied it
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermissionGrantsResponse {
    pub name: String,
    pub granted_users: Vec<String>,
    pub denied_users: Vec<String>,
    pub granted_groups: Vec<String>,
    pub denied_groups: Vec<String>,
}

impl From<Permission> for PermissionGrantsResponse {
    fn from(permission: Permission) -> Self {
        let mut granted_users: Vec<String> = permission.granted_users.into_iter().collect();
        granted_users.sort();
        let mut denied_users: Vec<String> = permission.denied_users.into_iter().collect();
        denied_users.sort();
        let mut granted_groups: Vec<String> = permission.granted_groups.into_iter().collect();
        granted_groups.sort();
        let mut denied_groups: Vec<String> = permission.denied_groups.into_iter().collect();
        denied_groups.sort();

        Self {
            name: permission.name,
            granted_users,
            denied_users,
            granted_groups,
            denied_groups,
        }
    }
}

/// Query parameters for the permission list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct PermissionsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Substring filter over the name
    pub filter: Option<String>,
}

/// Permissions service state
#[derive(Clone)]
pub struct PermissionsState {
    pub permission_repo: Arc<PermissionRepository>,
    pub create_permission: Arc<CreatePermissionUseCase<MongoUnitOfWork>>,
    pub delete_permission: Arc<DeletePermissionUseCase<MongoUnitOfWork>>,
}

/// Lookup by name first (names are uppercase and unique), falling back
/// to id.
async fn load_permission(state: &PermissionsState, key: &str) -> Result<Permission, AdminError> {
    if let Some(permission) = state.permission_repo.find_by_name(key).await? {
        return Ok(permission);
    }
    state
        .permission_repo
        .find_by_id(key)
        .await?
        .ok_or_else(|| AdminError::not_found("Permission", key))
}

/// List permissions
#[utoipa::path(
    get,
    path = "",
    tag = "permissions",
    operation_id = "getApiAdminPermissions",
    params(PermissionsQuery),
    responses(
        (status = 200, description = "Paged permissions", body = PaginatedResponse<PermissionResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_permissions(
    State(state): State<PermissionsState>,
    auth: Authenticated,
    Query(query): Query<PermissionsQuery>,
) -> Result<Json<PaginatedResponse<PermissionResponse>>, AdminError> {
    checks::require_admin(&auth.0)?;

    let filter = query.filter.as_deref();
    let permissions = state
        .permission_repo
        .find_page(filter, query.pagination.offset(), query.pagination.limit())
        .await?;
    let total = state.permission_repo.count(filter).await?;

    let data: Vec<PermissionResponse> = permissions.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.pagination.page(),
        query.pagination.size(),
        total,
    )))
}

/// Create a new permission
#[utoipa::path(
    post,
    path = "",
    tag = "permissions",
    operation_id = "postApiAdminPermissions",
    request_body = CreatePermissionRequest,
    responses(
        (status = 201, description = "Permission created", body = CreatedResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Duplicate or reserved name")
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_permission(
    State(state): State<PermissionsState>,
    auth: Authenticated,
    Json(req): Json<CreatePermissionRequest>,
) -> Result<Json<CreatedResponse>, AdminError> {
    checks::require_admin(&auth.0)?;

    let command = CreatePermissionCommand {
        name: req.name,
        notes: req.notes,
    };
    let ctx = ExecutionContext::create(&auth.user_id);

    let event = state
        .create_permission
        .execute(command, ctx)
        .await
        .into_result()?;
    Ok(Json(CreatedResponse::new(event.permission_id)))
}

/// Get permission by name or id
#[utoipa::path(
    get,
    path = "/{name}",
    tag = "permissions",
    operation_id = "getApiAdminPermissionsByName",
    params(("name" = String, Path, description = "Permission name or id")),
    responses(
        (status = 200, description = "Permission found", body = PermissionResponse),
        (status = 404, description = "Permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_permission(
    State(state): State<PermissionsState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Json<PermissionResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let permission = load_permission(&state, &name).await?;
    Ok(Json(permission.into()))
}

/// Get the grant index of a permission
#[utoipa::path(
    get,
    path = "/{name}/grants",
    tag = "permissions",
    operation_id = "getApiAdminPermissionsByNameGrants",
    params(("name" = String, Path, description = "Permission name or id")),
    responses(
        (status = 200, description = "Grant index", body = PermissionGrantsResponse),
        (status = 404, description = "Permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_permission_grants(
    State(state): State<PermissionsState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Json<PermissionGrantsResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let permission = load_permission(&state, &name).await?;
    Ok(Json(permission.into()))
}

/// Delete permission
#[utoipa::path(
    delete,
    path = "/{name}",
    tag = "permissions",
    operation_id = "deleteApiAdminPermissionsByName",
    params(("name" = String, Path, description = "Permission name or id")),
    responses(
        (status = 200, description = "Permission deleted", body = SuccessResponse),
        (status = 404, description = "Permission not found")
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_permission(
    State(state): State<PermissionsState>,
    auth: Authenticated,
    Path(name): Path<String>,
) -> Result<Json<SuccessResponse>, AdminError> {
    checks::require_admin(&auth.0)?;
    let permission = load_permission(&state, &name).await?;

    let command = DeletePermissionCommand {
        permission_id: permission.id,
    };
    let ctx = ExecutionContext::create(&auth.user_id);

    state
        .delete_permission
        .execute(command, ctx)
        .await
        .into_result()?;
    Ok(Json(SuccessResponse::ok()))
}

/// Create permissions router
pub fn permissions_router(state: PermissionsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(create_permission, list_permissions))
        .routes(routes!(get_permission, delete_permission))
        .routes(routes!(get_permission_grants))
        .with_state(state)
}
