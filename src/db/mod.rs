//! Database abstraction layer for LMS Insight.
//!
//! Provides a trait-based interface for running parameterized queries against
//! the LMS database, so the reporting code can be exercised against the
//! scripted mock as well as the real PostgreSQL pool.

mod mock;
mod postgres;
mod prefix;
mod types;

pub use mock::{FailingDatabaseClient, MockDatabaseClient, RecordedQuery};
pub use postgres::PostgresClient;
pub use prefix::TablePrefix;
pub use types::{ColumnInfo, QueryResult, Row, Value};

use crate::config::DatabaseConfig;
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Creates the shared database client for the given configuration.
pub async fn connect(config: &DatabaseConfig) -> Result<Arc<dyn DatabaseClient>> {
    let client = PostgresClient::connect(config).await?;
    Ok(Arc::new(client))
}

/// Trait defining the interface for database clients.
///
/// All database operations are async and return Results with InsightError.
#[async_trait]
pub trait DatabaseClient: Send + Sync {
    /// Executes a SQL statement with positional parameters (`$1`, `$2`, ...)
    /// bound through the driver, and returns the result rows.
    async fn execute_query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Checks that the database is reachable.
    async fn ping(&self) -> Result<()>;

    /// Closes the database connection.
    async fn close(&self) -> Result<()>;
}
