//! Saved reports and ad-hoc SQL execution.

use crate::api::types::{
    DeleteResponse, ExecuteRequest, ExecuteResponse, RunRequest, ValidateRequest,
};
use crate::api::{ApiResult, AppState};
use crate::error::InsightError;
use crate::persistence::{NewReport, ReportChanges, ReportDefinition};
use crate::query::clamp_positive;
use crate::safety::{classify_sql, Verdict};
use axum::body::Bytes;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

pub async fn list_reports_handler(
    State(state): State<AppState>,
) -> ApiResult<Vec<ReportDefinition>> {
    Ok(Json(state.reports.list().await?))
}

pub async fn get_report_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<ReportDefinition> {
    let Path(id) = id?;
    Ok(Json(state.reports.get(&id).await?))
}

pub async fn create_report_handler(
    State(state): State<AppState>,
    payload: Result<Json<NewReport>, JsonRejection>,
) -> ApiResult<ReportDefinition> {
    let Json(new) = payload?;
    Ok(Json(state.reports.create(new).await?))
}

pub async fn update_report_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    payload: Result<Json<ReportChanges>, JsonRejection>,
) -> ApiResult<ReportDefinition> {
    let Path(id) = id?;
    let Json(changes) = payload?;
    Ok(Json(state.reports.update(&id, changes).await?))
}

pub async fn delete_report_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<DeleteResponse> {
    let Path(id) = id?;
    state.reports.delete(&id).await?;
    Ok(Json(DeleteResponse { success: true, id }))
}

/// Runs operator-authored SQL through the read-only check, then executes it.
pub async fn execute_handler(
    State(state): State<AppState>,
    payload: Result<Json<ExecuteRequest>, JsonRejection>,
) -> ApiResult<ExecuteResponse> {
    let Json(request) = payload?;
    if request.sql.trim().is_empty() {
        return Err(InsightError::validation("SQL query is required"));
    }
    run_adhoc(&state, &request.sql, request.limit.as_deref()).await
}

/// Reports whether the SQL would be accepted, without running it.
pub async fn validate_handler(
    payload: Result<Json<ValidateRequest>, JsonRejection>,
) -> ApiResult<Verdict> {
    let Json(request) = payload?;
    Ok(Json(classify_sql(&request.sql)))
}

/// Executes a saved report. The body (`{"limit": n}`) is optional.
pub async fn run_report_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
    body: Bytes,
) -> ApiResult<ExecuteResponse> {
    let Path(id) = id?;
    let request: RunRequest = if body.iter().all(u8::is_ascii_whitespace) {
        RunRequest::default()
    } else {
        serde_json::from_slice(&body)
            .map_err(|e| InsightError::validation(format!("Invalid request body: {e}")))?
    };

    let report = state.reports.get(&id).await?;
    run_adhoc(&state, &report.sql, request.limit.as_deref()).await
}

async fn run_adhoc(
    state: &AppState,
    sql: &str,
    limit: Option<&str>,
) -> ApiResult<ExecuteResponse> {
    let limit = clamp_positive(
        limit,
        state.limits.default_execute_rows,
        state.limits.max_execute_rows,
    );
    let execution = state.executor.execute_adhoc(sql, limit).await?;
    Ok(Json(ExecuteResponse::from(execution)))
}
