use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;

use crate::AppState;

/// Tracks application start time for uptime calculation
static START_TIME: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();

/// Initialize the start time (call this on application startup)
pub fn init_start_time() {
    let _ = START_TIME.get_or_init(Instant::now);
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
enum ComponentStatus {
    Up,
    Down,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: ComponentStatus,
    version: String,
    timestamp: String,
    uptime_secs: u64,
    database: ComponentStatus,
}

pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_check))
        .route("/status", get(status))
}

/// Liveness and readiness in one: pings the database and reports overall
/// status, returning 503 when the database is unreachable.
async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let database = match state.db.ping().await {
        Ok(()) => ComponentStatus::Up,
        Err(_) => ComponentStatus::Down,
    };

    let (status, code) = match database {
        ComponentStatus::Up => (ComponentStatus::Up, StatusCode::OK),
        ComponentStatus::Down => (ComponentStatus::Down, StatusCode::SERVICE_UNAVAILABLE),
    };

    let uptime_secs = START_TIME
        .get()
        .map(|start| start.elapsed().as_secs())
        .unwrap_or(0);

    let body = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_secs,
        database,
    };

    (code, Json(body))
}

/// Minimal identity endpoint
async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(json!({
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "environment": state.config.environment,
    }))
}
