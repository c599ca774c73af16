//! HTTP JSON API.
//!
//! Routes live under `/api`, plus an unauthenticated `/health` probe. Every
//! handler returns `Result<Json<T>, InsightError>`; errors become JSON bodies
//! through [`IntoResponse`](axum::response::IntoResponse) in [`error`].

pub mod error;
pub mod handlers;
pub mod types;

use crate::config::LimitsConfig;
use crate::db::{DatabaseClient, TablePrefix};
use crate::error::InsightError;
use crate::persistence::ReportStore;
use crate::query::QueryExecutor;
use crate::reporting::Reporting;
use axum::routing::{get, post};
use axum::{Json, Router};
use handlers::{courses, health, logs, overview, reports, users};
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub type ApiResult<T> = Result<Json<T>, InsightError>;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub executor: QueryExecutor,
    pub reporting: Reporting,
    pub reports: Arc<ReportStore>,
    pub limits: LimitsConfig,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseClient>,
        prefix: TablePrefix,
        reports: ReportStore,
        limits: LimitsConfig,
    ) -> Self {
        let executor = QueryExecutor::new(db);
        Self {
            reporting: Reporting::new(executor.clone(), prefix, limits),
            executor,
            reports: Arc::new(reports),
            limits,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/overview", get(overview::overview_handler))
        .route("/courses", get(courses::list_courses_handler))
        .route("/courses/{id}", get(courses::course_detail_handler))
        .route("/users/search", get(users::search_users_handler))
        .route("/users/{id}/grades", get(users::user_grades_handler))
        .route("/logs/login-activity", get(logs::login_activity_handler))
        .route("/logs/recent", get(logs::recent_logs_handler))
        .route(
            "/reports",
            get(reports::list_reports_handler).post(reports::create_report_handler),
        )
        .route("/reports/execute", post(reports::execute_handler))
        .route("/reports/validate", post(reports::validate_handler))
        .route(
            "/reports/{id}",
            get(reports::get_report_handler)
                .put(reports::update_report_handler)
                .delete(reports::delete_report_handler),
        )
        .route("/reports/{id}/run", post(reports::run_report_handler))
        .method_not_allowed_fallback(error::method_not_allowed);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health_handler))
        .nest("/api", api)
        .fallback(handlers::fallback_handler)
        .method_not_allowed_fallback(error::method_not_allowed)
        .layer(CatchPanicLayer::custom(error::handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
