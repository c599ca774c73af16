//! LMS Insight - a read-only reporting API over an LMS database.
//!
//! This library exposes the core modules to the binary and to integration tests.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod persistence;
pub mod query;
pub mod reporting;
pub mod safety;
