//! HTTP API tests.
//!
//! Drive the full router with `oneshot` against a scripted database and a
//! report store in a temporary directory.

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use lms_insight::api::{create_router, AppState};
use lms_insight::config::LimitsConfig;
use lms_insight::db::{
    ColumnInfo, DatabaseClient, FailingDatabaseClient, MockDatabaseClient, QueryResult,
    TablePrefix, Value,
};
use lms_insight::persistence::ReportStore;
use pretty_assertions::assert_eq;
use serde_json::{json, Value as JsonValue};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    mock: Arc<MockDatabaseClient>,
    _dir: TempDir,
}

fn app_with(mock: MockDatabaseClient) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(mock);
    let state = AppState::new(
        mock.clone(),
        TablePrefix::default(),
        ReportStore::new(dir.path().join("reports.json")),
        LimitsConfig::default(),
    );
    TestApp {
        router: create_router(state),
        mock,
        _dir: dir,
    }
}

fn app_with_client(client: Arc<dyn DatabaseClient>) -> (Router, TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let state = AppState::new(
        client,
        TablePrefix::default(),
        ReportStore::new(dir.path().join("reports.json")),
        LimitsConfig::default(),
    );
    (create_router(state), dir)
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<JsonValue>,
) -> (StatusCode, JsonValue) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        JsonValue::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, JsonValue) {
    send(router, "GET", uri, None).await
}

fn course_rows(ids: std::ops::RangeInclusive<i64>) -> QueryResult {
    let columns = [
        "id",
        "fullname",
        "shortname",
        "category",
        "visible",
        "startdate",
        "enddate",
        "enrolled_count",
        "completed_count",
    ]
    .into_iter()
    .map(|name| ColumnInfo::new(name, "int8"))
    .collect();

    let rows = ids
        .map(|id| {
            vec![
                Value::Int(id),
                Value::from(format!("Course {id:02}")),
                Value::from(format!("C{id}")),
                Value::Int(1),
                Value::Int(1),
                Value::Int(0),
                Value::Int(0),
                Value::Int(4),
                Value::Int(1),
            ]
        })
        .collect();

    QueryResult::with_data(columns, rows)
}

#[tokio::test]
async fn test_health_ok() {
    let app = app_with(MockDatabaseClient::new());
    let (status, body) = get(&app.router, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let (router, _dir) = app_with_client(Arc::new(FailingDatabaseClient));
    let (status, body) = get(&router, "/health").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn test_overview() {
    let app = app_with(
        MockDatabaseClient::new()
            .respond_to("FROM mdl_user WHERE", QueryResult::scalar("total", 57i64))
            .respond_to("FROM mdl_course", QueryResult::scalar("total", 6i64))
            .respond_to("mdl_logstore_standard_log", QueryResult::scalar("total", 0i64))
            .respond_to("mdl_user_enrolments", QueryResult::scalar("total", 140i64)),
    );

    let (status, body) = get(&app.router, "/api/overview").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "totalUsers": 57,
            "totalCourses": 6,
            "todayActivities": 0,
            "totalEnrollments": 140,
        })
    );
}

#[tokio::test]
async fn test_overview_database_down() {
    let (router, _dir) = app_with_client(Arc::new(FailingDatabaseClient));
    let (status, body) = get(&router, "/api/overview").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "DATABASE_UNAVAILABLE");
}

#[tokio::test]
async fn test_courses_second_page() {
    let app = app_with(
        MockDatabaseClient::new()
            .respond_to("AS total", QueryResult::scalar("total", 25i64))
            .respond_to("enrolled_count", course_rows(11..=20)),
    );

    let (status, body) = get(&app.router, "/api/courses?page=2&limit=10").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["courses"].as_array().unwrap().len(), 10);
    assert_eq!(body["courses"][0]["completion_rate"], 25);
    assert_eq!(
        body["pagination"],
        json!({"page": 2, "limit": 10, "total": 25, "totalPages": 3})
    );
}

#[tokio::test]
async fn test_courses_search_and_junk_paging() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(
        &app.router,
        "/api/courses?page=abc&limit=1%3B%20DROP%20TABLE%20x&search=bio",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["pagination"],
        json!({"page": 1, "limit": 10, "total": 0, "totalPages": 0})
    );
    let list = app.mock.recorded_matching("enrolled_count");
    assert!(list[0].sql.ends_with("LIMIT 10 OFFSET 0"));
    assert_eq!(list[0].params, vec![Value::from("%bio%")]);
}

#[tokio::test]
async fn test_course_detail_errors() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(&app.router, "/api/courses/abc").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, body) = get(&app.router, "/api/courses/99").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_user_search_short_query() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(&app.router, "/api/users/search?q=a").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);
    assert!(app.mock.recorded().is_empty());
}

#[tokio::test]
async fn test_user_grades_missing_user() {
    let app = app_with(MockDatabaseClient::new());
    let (status, _) = get(&app.router, "/api/users/12/grades").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_login_activity_fills_seven_days() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(&app.router, "/api/logs/login-activity?days=7").await;

    assert_eq!(status, StatusCode::OK);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 7);
    assert!(data
        .iter()
        .all(|d| d["login_count"] == 0 && d["unique_users"] == 0));
    assert_eq!(body["period"]["days"], 7);
    assert_eq!(data[6]["date"], body["period"]["to"]);
    assert_eq!(data[0]["date"], body["period"]["from"]);
}

#[tokio::test]
async fn test_repeated_query_key_is_json_validation_error() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(&app.router, "/api/logs/login-activity?days=7&days=8").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(app.mock.recorded().is_empty());
}

#[tokio::test]
async fn test_recent_logs() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(&app.router, "/api/logs/recent?limit=3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
    assert!(app.mock.recorded()[0].sql.ends_with("LIMIT 3"));
}

#[tokio::test]
async fn test_report_crud_round_trip() {
    let app = app_with(MockDatabaseClient::new());

    let (status, created) = send(
        &app.router,
        "POST",
        "/api/reports",
        Some(json!({"name": "R1", "sql": "SELECT 1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["id"].as_str().unwrap().to_string();
    assert!(!id.is_empty());
    assert!(created["createdAt"].is_string());
    assert!(created["updatedAt"].is_string());

    let (status, fetched) = get(&app.router, &format!("/api/reports/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "R1");
    assert_eq!(fetched["sql"], "SELECT 1");

    let (status, updated) = send(
        &app.router,
        "PUT",
        &format!("/api/reports/{id}"),
        Some(json!({"description": "smoke test"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "R1");
    assert_eq!(updated["description"], "smoke test");

    let (status, list) = get(&app.router, "/api/reports").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, deleted) = send(&app.router, "DELETE", &format!("/api/reports/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted, json!({"success": true, "id": id.clone()}));

    let (status, _) = get(&app.router, &format!("/api/reports/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_report_create_rejects_update_statement() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/reports",
        Some(json!({"name": "bad", "sql": "UPDATE t SET x=1"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    let (_, list) = get(&app.router, "/api/reports").await;
    assert_eq!(list, json!([]));
}

#[tokio::test]
async fn test_report_update_unknown_id_is_not_found() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = send(
        &app.router,
        "PUT",
        "/api/reports/missing",
        Some(json!({"sql": "DROP TABLE mdl_user"})),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_malformed_body_is_validation_error() {
    let app = app_with(MockDatabaseClient::new());

    let request = Request::builder()
        .method("POST")
        .uri("/api/reports")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_execute_injects_limit() {
    let rows = QueryResult::with_data(
        vec![ColumnInfo::new("id", "int8"), ColumnInfo::new("fullname", "text")],
        vec![
            vec![Value::Int(2), Value::from("Algebra")],
            vec![Value::Int(3), Value::from("Biology")],
        ],
    );
    let app = app_with(MockDatabaseClient::new().respond_to("mdl_course", rows));

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/reports/execute",
        Some(json!({"sql": "SELECT id, fullname FROM mdl_course;", "limit": 5})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["rowCount"], 2);
    assert!(body["executionTime"].is_u64());
    assert_eq!(body["columns"], json!(["id", "fullname"]));
    assert_eq!(body["data"][1], json!({"id": 3, "fullname": "Biology"}));
    assert!(body.get("warning").is_none());
    assert_eq!(
        app.mock.recorded()[0].sql,
        "SELECT id, fullname FROM mdl_course\nLIMIT 5"
    );
}

#[tokio::test]
async fn test_execute_rejects_mutation_before_database() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/reports/execute",
        Some(json!({"sql": "DELETE FROM mdl_user"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Only SELECT and WITH queries are allowed");
    assert!(app.mock.recorded().is_empty());
}

#[tokio::test]
async fn test_execute_requires_sql() {
    let app = app_with(MockDatabaseClient::new());
    let (status, _) = send(&app.router, "POST", "/api/reports/execute", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_execute_surfaces_driver_message() {
    let app = app_with(
        MockDatabaseClient::new().fail_on("mdl_nope", "relation \"mdl_nope\" does not exist"),
    );

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/reports/execute",
        Some(json!({"sql": "SELECT * FROM mdl_nope"})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], "QUERY_ERROR");
    assert_eq!(body["error"], "relation \"mdl_nope\" does not exist");
}

#[tokio::test]
async fn test_execute_warns_on_stacked_statements() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/reports/execute",
        Some(json!({"sql": "SELECT 1; SELECT 2"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["warning"].as_str().unwrap().contains("2 statements"));
}

#[tokio::test]
async fn test_validate_endpoint() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = send(
        &app.router,
        "POST",
        "/api/reports/validate",
        Some(json!({"sql": "SELECT * FROM t; DROP TABLE t"})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["allowed"], false);
    assert_eq!(body["reason"], "Query contains forbidden keyword: DROP");
    assert!(app.mock.recorded().is_empty());
}

#[tokio::test]
async fn test_run_saved_report() {
    let app = app_with(
        MockDatabaseClient::new().respond_to("mdl_course", QueryResult::scalar("total", 6i64)),
    );
    let (_, created) = send(
        &app.router,
        "POST",
        "/api/reports",
        Some(json!({"name": "Courses", "sql": "SELECT COUNT(*) AS total FROM mdl_course"})),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = send(&app.router, "POST", &format!("/api/reports/{id}/run"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([{"total": 6}]));
    assert!(app.mock.recorded()[0].sql.ends_with("\nLIMIT 100"));

    let (status, _) = send(&app.router, "POST", "/api/reports/nope/run", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_route() {
    let app = app_with(MockDatabaseClient::new());
    let (status, body) = get(&app.router, "/api/nothing-here").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_wrong_method_is_json_error() {
    let app = app_with(MockDatabaseClient::new());

    let (status, body) = get(&app.router, "/api/reports/execute").await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");

    let (status, body) = send(&app.router, "POST", "/health", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
}
