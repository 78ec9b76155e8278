//! Health check handlers.

use axum::Json;
use axum::extract::State;
use crate::dto::response::{ApiResponse, DatabasePoolResponse, DetailedHealthResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::ok(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
    }))
}

/// GET /api/health/detailed
pub async fn health_detailed(
    State(state): State<AppState>,
) -> Json<ApiResponse<DetailedHealthResponse>> {
    let pool = match &state.database {
        Some(pool) => Some(pool.status().await),
        None => None,
    };
    let database = match pool {
        None => "disabled",
        Some(status) if status.reachable => "connected",
        Some(_) => "unavailable",
    };
    let status = if database == "unavailable" { "degraded" } else { "ok" };

    let hub = &state.hub;
    Json(ApiResponse::ok(DetailedHealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.uptime_seconds(),
        database: database.to_string(),
        database_pool: pool.map(DatabasePoolResponse::from),
        persistence_backend: hub.persistor.backend().to_string(),
        ws_connections: hub.registry.connection_count(),
        registered_users: hub.registry.registered_user_count(),
        online_users: hub.presence.online_count(),
        metrics: hub.metrics_snapshot(),
    }))
}
