//! Coercion of caller-supplied sizes and row-limit injection.
//!
//! `LIMIT` and `OFFSET` cannot always be bound as parameters, so every number
//! that ends up in SQL text passes through [`clamp_positive`] first.

use regex::Regex;
use std::sync::OnceLock;

/// Parses a raw query-string value as a positive integer.
///
/// Fractional input is truncated (`"7.9"` -> 7). Missing, unparseable, zero or
/// negative input yields `None`.
pub fn parse_positive(raw: Option<&str>) -> Option<u32> {
    let raw = raw?.trim();
    let value = match raw.parse::<i64>() {
        Ok(n) => n,
        Err(_) => {
            let f = raw.parse::<f64>().ok().filter(|f| f.is_finite())?;
            f.trunc() as i64
        }
    };
    (value >= 1).then(|| value.min(u32::MAX as i64) as u32)
}

/// Coerces a raw value to `1..=max`, using `default` when it is not a positive integer.
pub fn clamp_positive(raw: Option<&str>, default: u32, max: u32) -> u32 {
    parse_positive(raw).unwrap_or(default).clamp(1, max.max(1))
}

fn limit_clause() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\bLIMIT\s+(\d+|ALL\b|\$\d+)").expect("valid LIMIT regex")
    })
}

/// Returns true if the text already carries a `LIMIT` clause.
pub fn has_limit_clause(sql: &str) -> bool {
    limit_clause().is_match(sql)
}

/// Strips trailing whitespace and semicolons.
fn strip_terminator(sql: &str) -> &str {
    sql.trim().trim_end_matches(|c: char| c == ';' || c.is_whitespace())
}

/// Appends `LIMIT n` unless the text already has a limit clause.
///
/// The clause goes on its own line so a trailing `--` comment cannot swallow it.
pub fn with_row_limit(sql: &str, limit: u32) -> String {
    let body = strip_terminator(sql);
    if has_limit_clause(body) {
        body.to_string()
    } else {
        format!("{body}\nLIMIT {limit}")
    }
}
