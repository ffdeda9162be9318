//! Liveness endpoints

use axum::{Json, Router, routing::get};
use serde::Serialize;

use crate::state::AppState;

/// Liveness payload
///
/// Served without authentication; probes hit this before any token exists.
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

async fn health() -> Json<HealthResponse> {
    metrics::counter!("roster_health_checks_total").increment(1);

    Json(HealthResponse {
        status: "healthy",
        service: "roster",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Create liveness routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/healthz", get(health))
}
