//! Conversion of crate errors into JSON HTTP responses.

use crate::error::InsightError;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::any::Any;
use tracing::{error, warn};

const GENERIC_MESSAGE: &str = "Internal server error";

/// Body of every error response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
    pub code: &'static str,
}

impl ErrorBody {
    fn new(error: impl Into<String>, code: &'static str) -> Self {
        Self {
            success: false,
            error: error.into(),
            code,
        }
    }
}

impl InsightError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Connection(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Query(_) | Self::Config(_) | Self::Persistence(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Query(_) => "QUERY_ERROR",
            Self::Connection(_) => "DATABASE_UNAVAILABLE",
            Self::Config(_) | Self::Persistence(_) | Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Driver messages for failed queries are returned verbatim; faults on our
    /// side are reduced to a generic message.
    fn public_message(&self) -> String {
        match self {
            Self::Validation(msg) | Self::NotFound(msg) | Self::Query(msg) => msg.clone(),
            Self::Connection(_) => "Database is unavailable".to_string(),
            Self::Config(_) | Self::Persistence(_) | Self::Internal(_) => {
                GENERIC_MESSAGE.to_string()
            }
        }
    }
}

impl IntoResponse for InsightError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if self.is_client_error() {
            warn!(category = self.category(), "Request rejected: {self}");
        } else {
            error!(category = self.category(), "Request failed: {self}");
        }

        let body = ErrorBody::new(self.public_message(), self.error_code());
        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for InsightError {
    fn from(rejection: JsonRejection) -> Self {
        InsightError::validation(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for InsightError {
    fn from(rejection: QueryRejection) -> Self {
        InsightError::validation(format!("Invalid query string: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for InsightError {
    fn from(rejection: PathRejection) -> Self {
        InsightError::validation(format!("Invalid path: {}", rejection.body_text()))
    }
}

/// Answers a known route called with the wrong HTTP method.
pub async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(ErrorBody::new("Method not allowed", "METHOD_NOT_ALLOWED")),
    )
        .into_response()
}

/// Turns a handler panic into the generic 500 body.
pub fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!("Handler panicked: {detail}");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody::new(GENERIC_MESSAGE, "INTERNAL_ERROR")),
    )
        .into_response()
}
