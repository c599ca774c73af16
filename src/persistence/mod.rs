//! Persistence layer for LMS Insight.
//!
//! The LMS database is never written to. The only state this service owns is
//! the list of saved custom reports, kept in a JSON document on disk.

pub mod reports;

pub use reports::{NewReport, ReportChanges, ReportDefinition, ReportStore};
