//! Liveness and database connectivity.

use std::sync::Arc;

use axum::extract::State;
use serde::Serialize;
use tracing::warn;

use crate::response::ApiResponse;
use crate::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub database: ComponentStatus,
}

#[derive(Debug, Serialize)]
pub struct ComponentStatus {
    pub status: &'static str,
}

/// `GET /api/health`
///
/// Always answers 200; a broken database shows up as `database.status`.
pub async fn health(State(state): State<Arc<AppState>>) -> ApiResponse<HealthReport> {
    let database = if state.db.health_check().await {
        "UP"
    } else {
        warn!("Health check: database unreachable");
        "DOWN"
    };

    ApiResponse::ok(HealthReport {
        status: "UP",
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        database: ComponentStatus { status: database },
    })
}
