//! The seam between the report runner and whatever produces aggregation
//! results for a reporting month.

use std::path::PathBuf;

use report_core::error::Result;
use report_core::models::ReportWindow;
use report_data::reader::{load_response, locate_month_file};
use report_data::response::AggregationResponse;

/// Produces the per-organization, per-site core-hour sums for one window.
pub trait QueryExecutor {
    fn fetch(&self, window: &ReportWindow) -> Result<AggregationResponse>;
}

/// Reads results previously exported to a data directory, one file per month.
#[derive(Debug, Clone)]
pub struct FileQueryExecutor {
    data_dir: PathBuf,
}

impl FileQueryExecutor {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &std::path::Path {
        &self.data_dir
    }
}

impl QueryExecutor for FileQueryExecutor {
    fn fetch(&self, window: &ReportWindow) -> Result<AggregationResponse> {
        let path = locate_month_file(&self.data_dir, &window.month_key())?;
        tracing::debug!(
            period = %window.period,
            path = %path.display(),
            "reading stored aggregation result"
        );
        load_response(&path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use report_core::models::Period;
    use report_core::ReportError;
    use tempfile::TempDir;

    fn window(y: i32, m: u32) -> ReportWindow {
        let start = NaiveDate::from_ymd_opt(y, m, 1).unwrap();
        ReportWindow {
            period: Period::Current,
            start,
            end: start,
        }
    }

    #[test]
    fn test_fetch_reads_month_file() {
        let tmp = TempDir::new().expect("tempdir");
        std::fs::write(
            tmp.path().join("siteusage-2024-05.json"),
            r#"{"vo_bucket": {"buckets": []}}"#,
        )
        .unwrap();

        let exec = FileQueryExecutor::new(tmp.path());
        let resp = exec.fetch(&window(2024, 5)).unwrap();
        assert!(resp.orgs.unwrap().buckets.is_empty());
    }

    #[test]
    fn test_fetch_missing_month() {
        let tmp = TempDir::new().expect("tempdir");
        let exec = FileQueryExecutor::new(tmp.path());
        assert!(matches!(
            exec.fetch(&window(2024, 5)),
            Err(ReportError::NoDataFile { .. })
        ));
    }
}
