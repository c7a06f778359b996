//! Gatehouse Server
//!
//! Production server for the admin REST APIs:
//! - Auth: sign-in callback and session introspection
//! - Admin: users, groups, permissions, audit logs
//! - Health probes
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATE_API_PORT` | `8080` | HTTP API port |
//! | `GATE_MONGO_URL` | `mongodb://localhost:27017` | MongoDB connection URL |
//! | `GATE_MONGO_DB` | `gatehouse` | MongoDB database name |
//! | `GATE_SESSION_SECRET` | - | HMAC secret for session tokens (required) |
//! | `GATE_SESSION_ISSUER` | `gatehouse` | Session token issuer claim |
//! | `GATE_SESSION_TTL_SECS` | `28800` | Session lifetime in seconds |
//! | `GATE_REGISTRATION_RESTRICTION` | - | Regex a first-time email must match |
//! | `GATE_DEV_MODE` | `false` | Seed development data on startup |
//! | `RUST_LOG` | `info` | Log level |

use std::sync::Arc;
use axum::Router;
use utoipa_axum::router::OpenApiRouter;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use anyhow::{Context, Result};
use regex::Regex;
use tracing::info;
use tokio::{net::TcpListener, signal};
use utoipa_swagger_ui::SwaggerUi;

use gate_platform::api::{
    audit_logs_router, auth_router, groups_router, health_router, permissions_router,
    users_router, AppState, AuditLogsState, AuthApiState, GroupsState, HealthState,
    PermissionsState, UsersState,
};
use gate_platform::operations::{
    CreateGroupUseCase, CreatePermissionUseCase, DeleteGroupUseCase, DeletePermissionUseCase,
    UpdateGroupUseCase,
};
use gate_platform::repository::{
    AuditLogRepository, GroupRepository, PermissionRepository, UserRepository,
};
use gate_platform::seed::DevDataSeeder;
use gate_platform::shared::indexes::initialize_indexes;
use gate_platform::{
    AuditService, MongoUnitOfWork, OAuthUserProvider, SessionConfig, SessionService,
};

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_or_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[tokio::main]
async fn main() -> Result<()> {
    gate_common::logging::init_logging("gate-server");

    info!("Starting Gatehouse Server");

    // Configuration from environment
    let api_port: u16 = env_or_parse("GATE_API_PORT", 8080);
    let mongo_url = env_or("GATE_MONGO_URL", "mongodb://localhost:27017");
    let mongo_db = env_or("GATE_MONGO_DB", "gatehouse");
    let session_secret = std::env::var("GATE_SESSION_SECRET")
        .context("GATE_SESSION_SECRET must be set")?;
    let session_issuer = env_or("GATE_SESSION_ISSUER", "gatehouse");
    let session_ttl_secs: i64 = env_or_parse("GATE_SESSION_TTL_SECS", 28800);

    let registration_restriction = match std::env::var("GATE_REGISTRATION_RESTRICTION") {
        Ok(pattern) if !pattern.is_empty() => Some(
            Regex::new(&pattern).context("GATE_REGISTRATION_RESTRICTION is not a valid regex")?,
        ),
        _ => None,
    };

    // Connect to MongoDB
    info!("Connecting to MongoDB: {}/{}", mongo_url, mongo_db);
    let mongo_client = mongodb::Client::with_uri_str(&mongo_url).await?;
    let db = mongo_client.database(&mongo_db);

    initialize_indexes(&db).await?;

    // Seed development data if in dev mode
    let dev_mode = std::env::var("GATE_DEV_MODE")
        .map(|v| v == "true" || v == "1")
        .unwrap_or(false);
    if dev_mode {
        let seeder = DevDataSeeder::new(db.clone());
        if let Err(e) = seeder.seed().await {
            tracing::warn!("Dev data seeding skipped (data may already exist): {}", e);
        }
    }

    // Initialize repositories
    let user_repo = Arc::new(UserRepository::new(&db));
    let group_repo = Arc::new(GroupRepository::new(&db));
    let permission_repo = Arc::new(PermissionRepository::new(&db));
    let audit_log_repo = Arc::new(AuditLogRepository::new(&db));
    info!("Repositories initialized");

    // Services
    let sessions = Arc::new(SessionService::new(SessionConfig {
        secret_key: session_secret,
        issuer: session_issuer,
        session_ttl_secs,
    }));
    let audit_service = Arc::new(AuditService::new(audit_log_repo.clone()));
    let provider = Arc::new(OAuthUserProvider::new(
        user_repo.clone(),
        group_repo.clone(),
        permission_repo.clone(),
        registration_restriction,
    ));
    info!("Auth services initialized");

    // Create UnitOfWork for atomic commits with events and audit logs
    let unit_of_work = Arc::new(MongoUnitOfWork::new(mongo_client.clone(), db.clone()));

    // Group use cases
    let create_group = Arc::new(CreateGroupUseCase::new(
        group_repo.clone(),
        permission_repo.clone(),
        unit_of_work.clone(),
    ));
    let update_group = Arc::new(UpdateGroupUseCase::new(
        group_repo.clone(),
        unit_of_work.clone(),
    ));
    let delete_group = Arc::new(DeleteGroupUseCase::new(
        group_repo.clone(),
        user_repo.clone(),
        permission_repo.clone(),
        unit_of_work.clone(),
    ));

    // Permission use cases
    let create_permission = Arc::new(CreatePermissionUseCase::new(
        permission_repo.clone(),
        unit_of_work.clone(),
    ));
    let delete_permission = Arc::new(DeletePermissionUseCase::new(
        permission_repo.clone(),
        user_repo.clone(),
        group_repo.clone(),
        unit_of_work.clone(),
    ));

    // Build API states
    let app_state = AppState {
        sessions: sessions.clone(),
    };
    let auth_state = AuthApiState {
        provider,
        sessions,
        audit: audit_service.clone(),
    };
    let users_state = UsersState {
        user_repo: user_repo.clone(),
        group_repo: group_repo.clone(),
        permission_repo: permission_repo.clone(),
        audit: audit_service.clone(),
    };
    let groups_state = GroupsState {
        group_repo,
        user_repo,
        permission_repo: permission_repo.clone(),
        audit: audit_service,
        create_group,
        update_group,
        delete_group,
    };
    let permissions_state = PermissionsState {
        permission_repo,
        create_permission,
        delete_permission,
    };
    let audit_logs_state = AuditLogsState {
        audit_repo: audit_log_repo,
    };

    // Build API router using OpenApiRouter for auto-collected OpenAPI paths
    let (router, mut openapi) = OpenApiRouter::new()
        .nest("/auth", auth_router(auth_state))
        .nest("/api/admin/users", users_router(users_state))
        .nest("/api/admin/groups", groups_router(groups_state))
        .nest("/api/admin/permissions", permissions_router(permissions_state))
        .nest("/api/admin/audit-logs", audit_logs_router(audit_logs_state))
        .split_for_parts();

    // Add schemas referenced through #[serde(flatten)] that are not
    // auto-collected
    use utoipa::openapi::{schema::Type, ObjectBuilder};
    if let Some(components) = openapi.components.as_mut() {
        components.schemas.insert(
            "PaginationParams".to_string(),
            ObjectBuilder::new()
                .property("page", ObjectBuilder::new().schema_type(Type::Integer))
                .property("limit", ObjectBuilder::new().schema_type(Type::Integer))
                .into(),
        );
    }

    openapi.info.title = "Gatehouse API".to_string();
    openapi.info.version = env!("CARGO_PKG_VERSION").to_string();
    openapi.info.description =
        Some("REST APIs for user, group, and permission administration".to_string());

    let app = Router::new()
        .merge(router)
        .merge(health_router(HealthState { db }))
        .merge(SwaggerUi::new("/swagger-ui").url("/q/openapi", openapi))
        .layer(axum::Extension(app_state))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any));

    // Start API server
    let api_addr = format!("0.0.0.0:{}", api_port);
    info!("API server listening on http://{}", api_addr);

    let api_listener = TcpListener::bind(&api_addr).await?;
    let api_task = tokio::spawn(async move {
        if let Err(e) = axum::serve(api_listener, app).await {
            tracing::error!("API server error: {}", e);
        }
    });

    info!("Gatehouse Server started");
    info!("Press Ctrl+C to shutdown");

    shutdown_signal().await;
    info!("Shutdown signal received...");

    api_task.abort();

    info!("Gatehouse Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
