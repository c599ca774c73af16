//! Read-only query guard.
//!
//! Decides from SQL text alone whether a user-authored statement may be run
//! against the LMS database. The verdict is a keyword heuristic, not a
//! sandbox: it checks the leading keyword and a fixed denylist of substrings.
//! A parse with sqlparser runs alongside it purely to surface advisory
//! warnings (stacked statements, unparseable text); it never changes the
//! verdict.

mod classifier;
mod parser;

pub use classifier::{classify_sql, is_read_only, ALLOWED_PREFIXES, DENIED_KEYWORDS};
pub use parser::{inspect_statements, StatementInspection};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a statement was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DenyReason {
    /// The text does not start with `SELECT` or `WITH`.
    NotReadOnlyStatement,
    /// A denylisted keyword occurs somewhere in the text.
    ForbiddenKeyword(&'static str),
}

impl fmt::Display for DenyReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotReadOnlyStatement => {
                write!(f, "Only SELECT and WITH queries are allowed")
            }
            Self::ForbiddenKeyword(keyword) => {
                write!(f, "Query contains forbidden keyword: {keyword}")
            }
        }
    }
}

/// Result of checking a SQL string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the statement may be executed.
    pub allowed: bool,
    /// Human-readable reason for a denial.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Advisory note that does not affect `allowed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl Verdict {
    /// An allowing verdict.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
            warning: None,
        }
    }

    /// A denying verdict.
    pub fn deny(reason: DenyReason) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.to_string()),
            warning: None,
        }
    }

    /// Attaches an advisory warning.
    pub fn with_warning(mut self, warning: Option<String>) -> Self {
        self.warning = warning;
        self
    }

    /// Returns the denial message, falling back to a generic one.
    pub fn denial_message(&self) -> &str {
        self.reason
            .as_deref()
            .unwrap_or("Query is not a read-only statement")
    }
}
