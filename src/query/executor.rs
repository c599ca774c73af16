//! Query execution with safety classification.
//!
//! The executor is the single path from the HTTP layer to the database. Fixed
//! reporting SQL goes through [`QueryExecutor::fetch`]; operator-authored SQL
//! goes through [`QueryExecutor::execute_adhoc`], which classifies it first.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::limits::with_row_limit;
use crate::db::{DatabaseClient, QueryResult, Value};
use crate::error::{InsightError, Result};
use crate::safety::classify_sql;

/// Outcome of running one statement. Driver failures are values, not panics.
#[derive(Debug)]
pub enum ExecutionOutcome {
    /// The statement ran and produced these rows.
    Success(QueryResult),
    /// The statement failed; carries the driver's message.
    Failure(InsightError),
}

impl ExecutionOutcome {
    /// Returns true if the statement ran.
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// Converts the outcome into a `Result` for `?` propagation.
    pub fn into_result(self) -> Result<QueryResult> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(error) => Err(error),
        }
    }
}

/// An ad-hoc query that passed the guard and ran.
#[derive(Debug)]
pub struct AdhocExecution {
    /// The SQL actually sent, including any injected `LIMIT`.
    pub sql: String,
    /// Rows returned.
    pub result: QueryResult,
    /// Advisory warning from the classifier.
    pub warning: Option<String>,
}

impl AdhocExecution {
    /// Wall-clock execution time as reported by the client.
    pub fn execution_time(&self) -> Duration {
        self.result.execution_time
    }
}

/// Query executor that handles SQL classification and execution.
#[derive(Clone)]
pub struct QueryExecutor {
    db: Arc<dyn DatabaseClient>,
}

impl QueryExecutor {
    /// Creates a new query executor.
    pub fn new(db: Arc<dyn DatabaseClient>) -> Self {
        Self { db }
    }

    /// Returns the underlying database client.
    pub fn db(&self) -> &Arc<dyn DatabaseClient> {
        &self.db
    }

    /// Runs a statement with bound parameters and captures any failure.
    pub async fn run(&self, sql: &str, params: &[Value]) -> ExecutionOutcome {
        match self.db.execute_query(sql, params).await {
            Ok(result) => {
                debug!(
                    rows = result.row_count,
                    elapsed_ms = result.execution_time.as_millis() as u64,
                    "query finished"
                );
                ExecutionOutcome::Success(result)
            }
            Err(e) => {
                warn!("Query failed: {e}");
                ExecutionOutcome::Failure(e)
            }
        }
    }

    /// Runs a statement and propagates failures as errors.
    pub async fn fetch(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        self.run(sql, params).await.into_result()
    }

    /// Classifies operator-authored SQL and, if it is read-only, runs it with
    /// a row limit injected when the text has none.
    pub async fn execute_adhoc(&self, sql: &str, limit: u32) -> Result<AdhocExecution> {
        let verdict = classify_sql(sql);
        if !verdict.allowed {
            warn!(reason = verdict.denial_message(), "Rejected ad-hoc query");
            return Err(InsightError::validation(verdict.denial_message()));
        }
        if let Some(warning) = &verdict.warning {
            warn!("{warning}");
        }

        let sql = with_row_limit(sql, limit);
        let result = self.fetch(&sql, &[]).await?;

        info!(
            rows = result.row_count,
            elapsed_ms = result.execution_time.as_millis() as u64,
            "Executed ad-hoc query"
        );

        Ok(AdhocExecution {
            sql,
            result,
            warning: verdict.warning,
        })
    }
}
