//! Keyword-based read-only classification.
//!
//! Matching is on an uppercased copy of the trimmed text and is substring
//! based, so a column named `timecreated` trips the `CREATE` rule. Statement
//! separators and comments are not interpreted. The original text is what
//! gets executed.

use super::parser::inspect_statements;
use super::{DenyReason, Verdict};

/// Leading keywords accepted as read-only statements.
pub const ALLOWED_PREFIXES: [&str; 2] = ["SELECT", "WITH"];

/// Keywords rejected anywhere in the text.
pub const DENIED_KEYWORDS: [&str; 10] = [
    "INSERT", "UPDATE", "DELETE", "DROP", "ALTER", "CREATE", "TRUNCATE", "REPLACE", "GRANT",
    "REVOKE",
];

/// Applies the heuristic and returns the first failed rule, if any.
fn check(sql: &str) -> Result<(), DenyReason> {
    let normalized = sql.trim().to_uppercase();

    if !ALLOWED_PREFIXES
        .iter()
        .any(|prefix| normalized.starts_with(prefix))
    {
        return Err(DenyReason::NotReadOnlyStatement);
    }

    match DENIED_KEYWORDS
        .iter()
        .find(|keyword| normalized.contains(*keyword))
    {
        Some(keyword) => Err(DenyReason::ForbiddenKeyword(*keyword)),
        None => Ok(()),
    }
}

/// Returns true if the text passes the read-only heuristic.
pub fn is_read_only(sql: &str) -> bool {
    check(sql).is_ok()
}

/// Classifies SQL text, attaching advisory parser warnings to allowed queries.
pub fn classify_sql(sql: &str) -> Verdict {
    match check(sql) {
        Ok(()) => Verdict::allow().with_warning(inspect_statements(sql).warning()),
        Err(reason) => Verdict::deny(reason),
    }
}
