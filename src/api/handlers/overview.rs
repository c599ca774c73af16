//! Dashboard totals.

use crate::api::{ApiResult, AppState};
use crate::reporting::Overview;
use axum::extract::State;
use axum::Json;

pub async fn overview_handler(State(state): State<AppState>) -> ApiResult<Overview> {
    Ok(Json(state.reporting.overview().await?))
}
