//! Integration tests for LMS Insight.
//!
//! The API and report store tests run against a scripted database client.
//! The PostgreSQL tests need a running server and are skipped unless
//! DATABASE_URL is set.

pub mod api_test;
pub mod reports_test;
