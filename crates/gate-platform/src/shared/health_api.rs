//! Health Check Endpoints
//!
//! Standard probes for Kubernetes and monitoring:
//! - /health - combined status with a database check
//! - /health/live - liveness probe
//! - /health/ready - readiness probe

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use mongodb::bson::doc;
use serde::Serialize;
use utoipa::ToSchema;

/// Health status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum HealthStatus {
    Up,
    Down,
}

/// Health response
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Clone)]
pub struct HealthState {
    pub db: mongodb::Database,
}

async fn health(State(state): State<HealthState>) -> impl IntoResponse {
    match state.db.run_command(doc! { "ping": 1 }).await {
        Ok(_) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: HealthStatus::Up,
                timestamp: Utc::now(),
                message: None,
            }),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: HealthStatus::Down,
                timestamp: Utc::now(),
                message: Some(e.to_string()),
            }),
        ),
    }
}

async fn live() -> impl IntoResponse {
    Json(HealthResponse {
        status: HealthStatus::Up,
        timestamp: Utc::now(),
        message: None,
    })
}

/// Create health router
pub fn health_router(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/live", get(live))
        .route("/health/ready", get(health))
        .with_state(state)
}
