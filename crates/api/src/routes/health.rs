//! Liveness probe, mounted at the root outside `/api/v1`.

use axum::extract::State;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Payload of `GET /health`.
#[derive(Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the database round trip fails.
    pub status: &'static str,
    /// Package name, distinguishes this service in shared dashboards.
    pub service: &'static str,
    /// Package version.
    pub version: &'static str,
    /// Result of the `SELECT 1` round trip.
    pub db_healthy: bool,
}

/// GET /health
///
/// Always answers 200; an unreachable database is reported as `degraded`
/// in the payload, not as an error status.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = toktak_db::health_check(&state.pool).await.is_ok();

    Json(HealthResponse {
        status: if db_healthy { "ok" } else { "degraded" },
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        db_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
