use axum::Json;
use crate::models::{HealthResponse, ReadyResponse};
use tracing::debug;

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    debug!("Health check requested");
    Json(HealthResponse::ok())
}

/// Readiness check endpoint. The editing server has no external dependencies,
/// so being able to answer is being ready.
pub async fn ready_check() -> Json<ReadyResponse> {
    debug!("Readiness check requested");
    Json(ReadyResponse::ok())
}
