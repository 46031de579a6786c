//! # Authorization HTTP Server
//!
//! Exposes the campus events access engine to front-end and routing layers
//! that cannot link the library directly.
//!
//! ## Endpoints
//!
//! - `POST /v1/check` - Access check for a set of role codes
//! - `POST /v1/actions` - Every action a set of role codes holds on a resource
//! - `GET /v1/roles` - Role catalog with user types
//! - `GET /v1/matrix` - Active permission matrix
//! - `GET /health` - Health check
//!
//! ## Configuration
//!
//! Environment variables:
//! - `PORT` - HTTP server port (default: 8080)
//! - `AUTHZ_MATRIX_PATH` - JSON matrix replacing the built-in one
//! - `RUST_LOG` - Log level (default: info)

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    serve, Router,
};
use campus_authz::{
    AccessDecision, AccessEngine, AccessRequest, ActionKind, AuthzError, EngineConfig, Identity,
    MatrixConfig, ResourceId, Role,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Shared application state
#[derive(Clone)]
struct AppState {
    engine: Arc<AccessEngine>,
    start_time: std::time::Instant,
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
}

/// Application error type
#[derive(Debug)]
enum AppError {
    BadRequest(String),
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg),
        };

        let body = Json(ErrorResponse {
            error: error.to_string(),
            message,
        });

        (status, body).into_response()
    }
}

impl From<AuthzError> for AppError {
    fn from(err: AuthzError) -> Self {
        if err.is_client_error() {
            AppError::BadRequest(err.to_string())
        } else {
            AppError::Internal(err.to_string())
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Access check response
#[derive(Debug, Serialize)]
struct CheckResponse {
    decision_id: String,
    timestamp: String,
    #[serde(flatten)]
    decision: AccessDecision,
}

/// Request for every permitted action on one resource
#[derive(Debug, Deserialize)]
struct ActionsRequest {
    #[serde(default)]
    roles: Vec<String>,
    resource: String,
}

#[derive(Debug, Serialize)]
struct ActionsResponse {
    resource: String,
    actions: Vec<ActionKind>,
}

#[derive(Debug, Serialize)]
struct RoleEntry {
    code: &'static str,
    name: &'static str,
    user_type: &'static str,
}

/// Health check response
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: String,
    uptime_seconds: u64,
    version: String,
}

/// POST /v1/check - Check access
async fn check_access(
    State(state): State<AppState>,
    payload: Result<Json<AccessRequest>, JsonRejection>,
) -> Result<Json<CheckResponse>, AppError> {
    let Json(req) = payload.map_err(|e| {
        warn!("Rejected access check body: {}", e.body_text());
        AppError::from(e)
    })?;
    let decision = state.engine.check_request(&req).map_err(|e| {
        warn!("Rejected access check: {}", e);
        AppError::from(e)
    })?;

    info!(
        "Access decision: {} {} on {} (roles: {})",
        if decision.allowed { "ALLOW" } else { "DENY" },
        decision.action,
        decision.resource,
        req.roles.join(",")
    );

    Ok(Json(CheckResponse {
        decision_id: Uuid::new_v4().to_string(),
        timestamp: Utc::now().to_rfc3339(),
        decision,
    }))
}

/// POST /v1/actions - List permitted actions
async fn permitted_actions(
    State(state): State<AppState>,
    payload: Result<Json<ActionsRequest>, JsonRejection>,
) -> Result<Json<ActionsResponse>, AppError> {
    let Json(req) = payload?;
    let identity = Identity::from_codes(&req.roles)?;
    let resource = ResourceId::parse(&req.resource)?;
    let actions = state.engine.permitted_actions(&identity, resource.as_str());

    Ok(Json(ActionsResponse {
        resource: resource.into(),
        actions,
    }))
}

/// GET /v1/roles - Role catalog
async fn list_roles() -> Json<Vec<RoleEntry>> {
    Json(
        Role::ALL
            .iter()
            .map(|role| RoleEntry {
                code: role.code(),
                name: role.display_name(),
                user_type: role.user_type().code(),
            })
            .collect(),
    )
}

/// GET /v1/matrix - Active permission matrix
async fn show_matrix(State(state): State<AppState>) -> Json<MatrixConfig> {
    Json(state.engine.matrix().to_config())
}

/// GET /health - Health check endpoint
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let uptime = state.start_time.elapsed().as_secs();

    Json(HealthResponse {
        status: "healthy".to_string(),
        uptime_seconds: uptime,
        version: campus_authz::VERSION.to_string(),
    })
}

/// Create the HTTP router with all endpoints
fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/v1/check", post(check_access))
        .route("/v1/actions", post(permitted_actions))
        .route("/v1/roles", get(list_roles))
        .route("/v1/matrix", get(show_matrix))
        .route("/health", get(health_check))
        .layer(ServiceBuilder::new().layer(trace).layer(cors))
        .with_state(state)
}

/// Port from `PORT`, 8080 when unset
fn parse_port(raw: Option<&str>) -> anyhow::Result<u16> {
    match raw {
        None => Ok(8080),
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("PORT must be a port number, got {:?}", raw)),
    }
}

/// Graceful shutdown handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C signal");
        }
        _ = terminate => {
            info!("Received SIGTERM signal");
        }
    }

    info!("Starting graceful shutdown");
}

/// Main server entrypoint
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting campus authorization server v{}", campus_authz::VERSION);

    let port = parse_port(std::env::var("PORT").ok().as_deref())?;

    let config = EngineConfig::from_env();
    info!("Configuration:");
    info!("  Port: {}", port);
    if let Some(path) = &config.matrix_path {
        info!("  Matrix: {}", path.display());
    }

    // A bad matrix must stop the process before any request is served
    let engine = AccessEngine::from_config(&config).context("permission matrix is invalid")?;

    let state = AppState {
        engine: Arc::new(engine),
        start_time: std::time::Instant::now(),
    };

    let app = create_router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!("Listening on {}", addr);

    serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down gracefully");
    Ok(())
}
