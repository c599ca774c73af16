//! Request handlers, one module per resource.

pub mod courses;
pub mod health;
pub mod logs;
pub mod overview;
pub mod reports;
pub mod users;

use crate::error::{InsightError, Result};

pub async fn fallback_handler() -> InsightError {
    InsightError::not_found("Route not found")
}

/// Parses a numeric path segment, rejecting anything but an integer id.
pub(crate) fn parse_id(raw: &str, what: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| InsightError::validation(format!("Invalid {what} id '{raw}'")))
}
