//! Data ingestion layer for the site usage report.
//!
//! Decodes stored aggregation results, walks them into per-organization
//! accumulators, and runs the ingest-then-pivot pipeline.

pub mod analysis;
pub mod ingest;
pub mod reader;
pub mod response;

pub use report_core as core;
