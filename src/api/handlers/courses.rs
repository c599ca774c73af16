//! Course listing and detail.

use super::parse_id;
use crate::api::types::PageParams;
use crate::api::{ApiResult, AppState};
use crate::reporting::{CourseDetail, CoursePage};
use axum::extract::rejection::{PathRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

pub async fn list_courses_handler(
    State(state): State<AppState>,
    params: Result<Query<PageParams>, QueryRejection>,
) -> ApiResult<CoursePage> {
    let Query(params) = params?;
    let page = state
        .reporting
        .list_courses(
            params.page.as_deref(),
            params.limit.as_deref(),
            params.search.as_deref(),
        )
        .await?;
    Ok(Json(page))
}

pub async fn course_detail_handler(
    State(state): State<AppState>,
    id: Result<Path<String>, PathRejection>,
) -> ApiResult<CourseDetail> {
    let Path(id) = id?;
    let id = parse_id(&id, "course")?;
    Ok(Json(state.reporting.course_detail(id).await?))
}
