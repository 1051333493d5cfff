//! Runtime layer for the site usage report.
//!
//! Fetches both reporting months through a [`QueryExecutor`] and runs the
//! analysis pipeline over them.

pub mod query_executor;
pub mod runner;

pub use query_executor::{FileQueryExecutor, QueryExecutor};
pub use runner::{ReportOutcome, ReportRunner};

pub use report_core as core;
pub use report_data as data;
