use std::path::PathBuf;
use thiserror::Error;

use crate::models::Period;

/// All errors produced by the site usage reporter.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The nested aggregation result did not have the expected shape.
    #[error("Malformed aggregation result: {0}")]
    IngestShape(String),

    /// A sample arrived for a period that has already been closed.
    #[error("Period order violation: cannot record {attempted} data after {active} ingestion has begun")]
    PeriodOrder { active: Period, attempted: Period },

    /// A file could not be opened or read from disk.
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A JSON document could not be parsed.
    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// A date string did not match any recognised format.
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    /// The expected data directory does not exist.
    #[error("Data path not found: {0}")]
    DataPathNotFound(PathBuf),

    /// No aggregation result could be located for a reporting month.
    #[error("No aggregation result for {month} in {dir}")]
    NoDataFile { month: String, dir: PathBuf },

    /// A configuration value is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The finished table could not be rendered.
    #[error("Render error: {0}")]
    Render(String),

    /// Pass-through for any raw I/O error that does not carry a path.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Catch-all for errors from third-party crates via `anyhow`.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ReportError {
    /// Whether a retry of the same fetch could plausibly succeed.
    ///
    /// Only I/O level failures qualify; malformed data and bad configuration
    /// fail the same way every time.
    pub fn is_transient(&self) -> bool {
        matches!(self, ReportError::FileRead { .. } | ReportError::Io(_))
    }
}

/// Convenience alias used throughout the report crates.
pub type Result<T> = std::result::Result<T, ReportError>;
