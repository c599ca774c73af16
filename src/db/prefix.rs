//! LMS table naming.

use crate::config::validate_table_prefix;
use crate::error::Result;

/// Operator-configured prefix applied to every LMS table reference.
///
/// This is the only value interpolated into SQL text by the reporting
/// queries, so construction rejects anything but `[A-Za-z0-9_]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePrefix(String);

impl TablePrefix {
    pub fn new(prefix: impl Into<String>) -> Result<Self> {
        let prefix = prefix.into();
        validate_table_prefix(&prefix)?;
        Ok(Self(prefix))
    }

    /// Returns the prefixed table name, e.g. `user` -> `mdl_user`.
    pub fn table(&self, name: &str) -> String {
        format!("{}{}", self.0, name)
    }
}

impl Default for TablePrefix {
    fn default() -> Self {
        Self("mdl_".to_string())
    }
}
