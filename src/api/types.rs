//! Request and response bodies for the JSON API.

use crate::query::AdhocExecution;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Accepts a number or a numeric string and keeps the raw text, so it can go
/// through the same coercion as query-string parameters.
fn raw_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<JsonValue>::deserialize(deserializer)? {
        Some(JsonValue::Number(n)) => Some(n.to_string()),
        Some(JsonValue::String(s)) => Some(s),
        _ => None,
    })
}

#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchParams {
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DaysParams {
    pub days: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    pub limit: Option<String>,
}

/// `POST /api/reports/execute`
#[derive(Debug, Default, Deserialize)]
pub struct ExecuteRequest {
    #[serde(default)]
    pub sql: String,
    #[serde(default, deserialize_with = "raw_number")]
    pub limit: Option<String>,
}

/// `POST /api/reports/{id}/run`
#[derive(Debug, Default, Deserialize)]
pub struct RunRequest {
    #[serde(default, deserialize_with = "raw_number")]
    pub limit: Option<String>,
}

/// `POST /api/reports/validate`
#[derive(Debug, Default, Deserialize)]
pub struct ValidateRequest {
    #[serde(default)]
    pub sql: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecuteResponse {
    pub success: bool,
    pub row_count: usize,
    /// Milliseconds.
    pub execution_time: u64,
    pub columns: Vec<String>,
    pub data: Vec<Map<String, JsonValue>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl From<AdhocExecution> for ExecuteResponse {
    fn from(execution: AdhocExecution) -> Self {
        let execution_time = execution.execution_time().as_millis() as u64;
        let result = execution.result;
        Self {
            success: true,
            row_count: result.row_count,
            execution_time,
            columns: result.column_names(),
            data: result.records(),
            warning: execution.warning,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub id: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    pub database: &'static str,
}
