//! Audit Logs Admin API

use axum::{
    extract::{Query, State},
    Json,
};
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa::{IntoParams, ToSchema};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::audit::entity::AuditLog;
use crate::audit::repository::AuditLogRepository;
use crate::shared::api_common::{PaginatedResponse, PaginationParams};
use crate::shared::error::AdminError;
use crate::shared::middleware::{checks, Authenticated};

/// Audit log response DTO
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogResponse {
    pub id: String,
    pub entity_type: String,
    pub entity_id: Option<String>,
    pub operation: String,
    pub operation_json: Option<String>,
    pub principal_id: Option<String>,
    pub performed_at: String,
}

impl From<AuditLog> for AuditLogResponse {
    fn from(log: AuditLog) -> Self {
        Self {
            id: log.id,
            entity_type: log.entity_type,
            entity_id: log.entity_id,
            operation: log.operation,
            operation_json: log.operation_json,
            principal_id: log.principal_id,
            performed_at: log.performed_at.to_rfc3339(),
        }
    }
}

/// Query parameters for the audit log list
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct AuditLogsQuery {
    #[serde(flatten)]
    pub pagination: PaginationParams,

    /// Filter by entity type ("User", "Group", "Permission")
    pub entity_type: Option<String>,
}

/// Audit logs service state
#[derive(Clone)]
pub struct AuditLogsState {
    pub audit_repo: Arc<AuditLogRepository>,
}

/// List audit logs
#[utoipa::path(
    get,
    path = "",
    tag = "audit",
    operation_id = "getApiAdminAuditLogs",
    params(AuditLogsQuery),
    responses(
        (status = 200, description = "Paged audit logs", body = PaginatedResponse<AuditLogResponse>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_audit_logs(
    State(state): State<AuditLogsState>,
    auth: Authenticated,
    Query(query): Query<AuditLogsQuery>,
) -> Result<Json<PaginatedResponse<AuditLogResponse>>, AdminError> {
    checks::require_admin(&auth.0)?;

    let entity_type = query.entity_type.as_deref();
    let logs = state
        .audit_repo
        .find_page(entity_type, query.pagination.offset(), query.pagination.limit())
        .await?;
    let total = state.audit_repo.count(entity_type).await?;

    let data: Vec<AuditLogResponse> = logs.into_iter().map(Into::into).collect();
    Ok(Json(PaginatedResponse::new(
        data,
        query.pagination.page(),
        query.pagination.size(),
        total,
    )))
}

/// Create audit logs router
pub fn audit_logs_router(state: AuditLogsState) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(list_audit_logs))
        .with_state(state)
}
