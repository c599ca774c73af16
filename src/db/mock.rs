//! Mock database clients for testing.
//!
//! `MockDatabaseClient` answers queries from a script of substring matches and
//! records every statement it receives, so tests can assert both on the shaped
//! response and on the SQL and parameters that produced it.

use super::{DatabaseClient, QueryResult, Value};
use crate::error::{InsightError, Result};
use async_trait::async_trait;
use std::sync::Mutex;
use std::time::Duration;

/// A statement seen by the mock.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

enum Reply {
    Rows(QueryResult),
    Error(String),
}

/// A mock database client that returns scripted results.
///
/// Rules are checked in registration order; the first rule whose pattern is a
/// substring of the SQL wins. Unmatched SQL yields an empty result.
#[derive(Default)]
pub struct MockDatabaseClient {
    rules: Vec<(String, Reply)>,
    recorded: Mutex<Vec<RecordedQuery>>,
}

impl MockDatabaseClient {
    /// Creates a mock that answers every query with an empty result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers SQL containing `pattern` with `result`.
    pub fn respond_to(mut self, pattern: impl Into<String>, result: QueryResult) -> Self {
        self.rules.push((pattern.into(), Reply::Rows(result)));
        self
    }

    /// Fails SQL containing `pattern` with a query error carrying `message`.
    pub fn fail_on(mut self, pattern: impl Into<String>, message: impl Into<String>) -> Self {
        self.rules.push((pattern.into(), Reply::Error(message.into())));
        self
    }

    /// Returns every statement executed so far.
    pub fn recorded(&self) -> Vec<RecordedQuery> {
        self.recorded
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    /// Returns the recorded statements whose SQL contains `pattern`.
    pub fn recorded_matching(&self, pattern: &str) -> Vec<RecordedQuery> {
        self.recorded()
            .into_iter()
            .filter(|q| q.sql.contains(pattern))
            .collect()
    }
}

#[async_trait]
impl DatabaseClient for MockDatabaseClient {
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        if let Ok(mut recorded) = self.recorded.lock() {
            recorded.push(RecordedQuery {
                sql: sql.to_string(),
                params: params.to_vec(),
            });
        }

        match self.rules.iter().find(|(pattern, _)| sql.contains(pattern.as_str())) {
            Some((_, Reply::Rows(result))) => {
                Ok(result.clone().with_execution_time(Duration::from_millis(1)))
            }
            Some((_, Reply::Error(message))) => Err(InsightError::query(message.clone())),
            None => Ok(QueryResult::new()),
        }
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}

/// A database client whose every call fails as if the server were down.
#[derive(Debug, Default)]
pub struct FailingDatabaseClient;

#[async_trait]
impl DatabaseClient for FailingDatabaseClient {
    async fn execute_query(&self, _sql: &str, _params: &[Value]) -> Result<QueryResult> {
        Err(InsightError::connection("Database is unavailable"))
    }

    async fn ping(&self) -> Result<()> {
        Err(InsightError::connection("Database is unavailable"))
    }

    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
