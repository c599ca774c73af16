//! Login activity and recent log events.

use crate::api::types::{DaysParams, LimitParams};
use crate::api::{ApiResult, AppState};
use crate::reporting::{LogEntry, LoginActivity};
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::Json;

pub async fn login_activity_handler(
    State(state): State<AppState>,
    params: Result<Query<DaysParams>, QueryRejection>,
) -> ApiResult<LoginActivity> {
    let Query(params) = params?;
    let activity = state
        .reporting
        .login_activity(params.days.as_deref())
        .await?;
    Ok(Json(activity))
}

pub async fn recent_logs_handler(
    State(state): State<AppState>,
    params: Result<Query<LimitParams>, QueryRejection>,
) -> ApiResult<Vec<LogEntry>> {
    let Query(params) = params?;
    let entries = state
        .reporting
        .recent_logs(params.limit.as_deref())
        .await?;
    Ok(Json(entries))
}
