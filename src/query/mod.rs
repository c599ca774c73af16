//! Query execution for LMS Insight.
//!
//! This module isolates SQL execution, classification of operator-authored
//! SQL, and the coercion of numbers that end up in SQL text.

pub mod executor;
pub mod limits;

pub use executor::{AdhocExecution, ExecutionOutcome, QueryExecutor};
pub use limits::{clamp_positive, has_limit_clause, parse_positive, with_row_limit};
