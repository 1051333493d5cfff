//! Discovery and loading of stored aggregation results.
//!
//! Each reporting month is stored as one JSON document, conventionally named
//! `siteusage-YYYY-MM.json`, somewhere under the data directory.

use std::path::{Path, PathBuf};

use report_core::error::{ReportError, Result};
use tracing::{debug, warn};

use crate::response::AggregationResponse;

/// File-name prefix of stored monthly results.
pub const FILE_PREFIX: &str = "siteusage-";

// ── Public API ────────────────────────────────────────────────────────────────

/// Find all `.json` files recursively under `data_path`, sorted by path.
pub fn find_response_files(data_path: &Path) -> Vec<PathBuf> {
    if !data_path.exists() {
        warn!("Data path does not exist: {}", data_path.display());
        return Vec::new();
    }

    let mut files: Vec<PathBuf> = walkdir::WalkDir::new(data_path)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .path()
                    .extension()
                    .map(|ext| ext == "json")
                    .unwrap_or(false)
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    files
}

/// Locate the stored result for `month_key` (`"YYYY-MM"`).
///
/// `siteusage-YYYY-MM.json` at the top of `data_path` wins; otherwise the
/// first file (by path) whose stem ends in the month key is used.
pub fn locate_month_file(data_path: &Path, month_key: &str) -> Result<PathBuf> {
    if !data_path.is_dir() {
        return Err(ReportError::DataPathNotFound(data_path.to_path_buf()));
    }

    let direct = data_path.join(format!("{}{}.json", FILE_PREFIX, month_key));
    if direct.is_file() {
        return Ok(direct);
    }

    find_response_files(data_path)
        .into_iter()
        .find(|p| {
            p.file_stem()
                .and_then(|s| s.to_str())
                .map(|s| s.ends_with(month_key))
                .unwrap_or(false)
        })
        .ok_or_else(|| ReportError::NoDataFile {
            month: month_key.to_string(),
            dir: data_path.to_path_buf(),
        })
}

/// Read and decode one stored aggregation result.
pub fn load_response(path: &Path) -> Result<AggregationResponse> {
    let content = std::fs::read_to_string(path).map_err(|source| ReportError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let value: serde_json::Value = serde_json::from_str(&content)?;
    let response = AggregationResponse::from_json(value)?;

    debug!(
        "Loaded {} organization buckets from {}",
        response.orgs.as_ref().map(|o| o.buckets.len()).unwrap_or(0),
        path.display()
    );
    Ok(response)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
