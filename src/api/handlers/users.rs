//! User search and per-user grades.

use super::parse_id;
use crate::api::types::UserSearchParams;
use crate::api::{ApiResult, AppState};
use crate::reporting::{UserGrades, UserPage};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

pub async fn search_users_handler(
    State(state): State<AppState>,
    params: Result<Query<UserSearchParams>, QueryRejection>,
) -> ApiResult<UserPage> {
    let Query(params) = params?;
    let page = state
        .reporting
        .search_users(
            params.q.as_deref(),
            params.page.as_deref(),
            params.limit.as_deref(),
        )
        .await?;
    Ok(Json(page))
}

pub async fn user_grades_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<UserGrades> {
    let Path(id) = id?;
    let id = parse_id(&id, "user")?;
    Ok(Json(state.reporting.user_grades(id).await?))
}
