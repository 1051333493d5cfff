//! Core types for the per-site usage report.
//!
//! Holds the per-organization accumulators, the pivot builder that turns them
//! into a [`models::ReportTable`], the shared percentage policy, and the
//! settings, error, date and formatting helpers used by the other crates.

pub mod accumulator;
pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod pivot;
pub mod settings;
pub mod time_utils;

pub use error::{ReportError, Result};
