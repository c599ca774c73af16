//! Page arithmetic shared by the list endpoints.

use crate::query::{clamp_positive, parse_positive};
use serde::Serialize;

/// A coerced page request. Both fields are always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Builds a request from raw query-string values.
    ///
    /// Anything that is not a positive integer falls back to page 1 and the
    /// default limit; the limit is clamped to `max_limit`.
    pub fn from_raw(
        page: Option<&str>,
        limit: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Self {
        Self {
            page: parse_positive(page).unwrap_or(1),
            limit: clamp_positive(limit, default_limit, max_limit),
        }
    }

    /// Rows to skip before this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }

    /// Renders the `LIMIT .. OFFSET ..` tail. Both numbers are already coerced.
    pub fn sql_clause(&self) -> String {
        format!("LIMIT {} OFFSET {}", self.limit, self.offset())
    }
}

/// Pagination block returned alongside every list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub limit: u32,
    pub total: i64,
    pub total_pages: i64,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total = total.max(0);
        let limit = i64::from(request.limit.max(1));
        Self {
            page: request.page,
            limit: request.limit,
            total,
            total_pages: (total + limit - 1) / limit,
        }
    }
}
