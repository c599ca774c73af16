//! Service health probe.

use crate::api::types::HealthResponse;
use crate::api::AppState;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::warn;

/// Liveness plus a `SELECT 1` probe of the LMS database.
pub async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let (status, database) = match state.executor.db().ping().await {
        Ok(()) => (StatusCode::OK, "ok"),
        Err(e) => {
            warn!("Health check failed: {e}");
            (StatusCode::SERVICE_UNAVAILABLE, "unavailable")
        }
    };

    (
        status,
        Json(HealthResponse {
            status: if status.is_success() { "ok" } else { "degraded" },
            version: env!("CARGO_PKG_VERSION"),
            database,
        }),
    )
}
