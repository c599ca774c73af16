//! Advisory statement inspection.
//!
//! Uses sqlparser-rs with the PostgreSQL dialect to count top-level
//! statements. The result only feeds warnings; the allow/deny decision stays
//! with the keyword heuristic so queries the parser cannot handle (vendor
//! syntax, newer grammar) still run.

use sqlparser::dialect::PostgreSqlDialect;
use sqlparser::parser::Parser;

/// Outcome of parsing a SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatementInspection {
    /// Parsed cleanly into this many top-level statements.
    Parsed { statements: usize },
    /// The parser rejected the text.
    Unparseable(String),
}

impl StatementInspection {
    /// Returns an advisory warning for anything other than a single statement.
    pub fn warning(&self) -> Option<String> {
        match self {
            Self::Parsed { statements } if *statements > 1 => Some(format!(
                "Query contains {statements} statements; only run stacked queries you trust"
            )),
            Self::Parsed { .. } => None,
            Self::Unparseable(err) => Some(format!(
                "Query could not be parsed for inspection ({err}); review it carefully"
            )),
        }
    }
}

/// Parses SQL and reports how many statements it holds.
pub fn inspect_statements(sql: &str) -> StatementInspection {
    match Parser::parse_sql(&PostgreSqlDialect {}, sql) {
        Ok(statements) => StatementInspection::Parsed {
            statements: statements.len(),
        },
        Err(e) => StatementInspection::Unparseable(e.to_string()),
    }
}
