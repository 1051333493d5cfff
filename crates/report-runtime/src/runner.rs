//! Report runner.
//!
//! Fetches the current and previous month through a [`QueryExecutor`],
//! retrying transient failures, and hands both results to the analysis
//! pipeline.

use std::thread;
use std::time::Duration;

use chrono::NaiveDate;
use report_core::error::{ReportError, Result};
use report_core::models::{ReportTable, ReportWindow};
use report_core::pivot::PivotReportBuilder;
use report_core::time_utils::{report_title, report_windows};
use report_data::analysis::{analyze_usage, AnalysisMetadata};
use report_data::response::AggregationResponse;

use crate::query_executor::QueryExecutor;

/// Default number of fetch attempts per window.
pub const MAX_FETCH_ATTEMPTS: u32 = 3;

/// Base back-off between attempts; doubled after every failure.
const BASE_BACKOFF_MS: u64 = 100;

// ── Public types ──────────────────────────────────────────────────────────────

/// Everything needed to render and deliver one report.
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub title: String,
    /// Current window first, then the previous one.
    pub windows: [ReportWindow; 2],
    pub table: ReportTable,
    pub metadata: AnalysisMetadata,
}

// ── ReportRunner ──────────────────────────────────────────────────────────────

pub struct ReportRunner<E: QueryExecutor> {
    executor: E,
    builder: PivotReportBuilder,
    max_attempts: u32,
    base_backoff: Duration,
}

impl<E: QueryExecutor> ReportRunner<E> {
    pub fn new(executor: E, builder: PivotReportBuilder) -> Self {
        Self {
            executor,
            builder,
            max_attempts: MAX_FETCH_ATTEMPTS,
            base_backoff: Duration::from_millis(BASE_BACKOFF_MS),
        }
    }

    /// Override the attempt count (at least one attempt is always made).
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn with_backoff(mut self, base: Duration) -> Self {
        self.base_backoff = base;
        self
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Build the report for the month containing `date`.
    ///
    /// `title` replaces the default month title when given.
    pub fn run(&self, date: NaiveDate, title: Option<&str>) -> Result<ReportOutcome> {
        let windows = report_windows(date);
        let [current_window, previous_window] = &windows;

        tracing::info!(
            start = %current_window.start,
            end = %current_window.end,
            "building site usage report"
        );

        let current = self.fetch_with_retry(current_window)?;
        let previous = self.fetch_with_retry(previous_window)?;

        let result = analyze_usage(&current, &previous, &self.builder)?;
        if result.metadata.ingest.dropped_samples > 0 {
            tracing::info!(
                dropped = result.metadata.ingest.dropped_samples,
                "previous-month samples outside the current population were dropped"
            );
        }

        let title = title
            .map(str::to_string)
            .unwrap_or_else(|| report_title(current_window));

        Ok(ReportOutcome {
            title,
            windows,
            table: result.table,
            metadata: result.metadata,
        })
    }

    /// Fetch one window, retrying transient errors with exponential back-off.
    pub fn fetch_with_retry(&self, window: &ReportWindow) -> Result<AggregationResponse> {
        let mut last_err: Option<ReportError> = None;

        for attempt in 0..self.max_attempts {
            if attempt > 0 {
                let sleep = self.base_backoff * 2u32.saturating_pow(attempt - 1);
                tracing::debug!(
                    attempt,
                    sleep_ms = sleep.as_millis() as u64,
                    "retrying fetch after back-off"
                );
                thread::sleep(sleep);
            }

            match self.executor.fetch(window) {
                Ok(response) => return Ok(response),
                Err(e) if e.is_transient() => {
                    tracing::warn!(attempt, period = %window.period, error = %e, "fetch attempt failed");
                    last_err = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_err.unwrap_or_else(|| {
            ReportError::Config(format!("no fetch attempted for {} window", window.period))
        }))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use report_core::models::{Cell, OpportunisticSet, Period, SummaryRow};
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::io;

    /// Serves canned responses keyed by month, failing the first
    /// `failures` calls with an I/O error.
    struct FakeExecutor {
        responses: HashMap<String, AggregationResponse>,
        failures: RefCell<u32>,
        calls: RefCell<Vec<String>>,
    }

    impl FakeExecutor {
        fn new(failures: u32) -> Self {
            let mut responses = HashMap::new();
            responses.insert(
                "2024-03".to_string(),
                AggregationResponse::from_pairs(vec![
                    ("osg", vec![("siteA", 100.0), ("siteB", 50.0)]),
                    ("atlas", vec![("siteA", 200.0)]),
                ]),
            );
            responses.insert(
                "2024-02".to_string(),
                AggregationResponse::from_pairs(vec![
                    ("osg", vec![("siteA", 80.0)]),
                    ("atlas", vec![("siteA", 150.0)]),
                ]),
            );
            Self {
                responses,
                failures: RefCell::new(failures),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<String> {
            self.calls.borrow().clone()
        }
    }

    impl QueryExecutor for FakeExecutor {
        fn fetch(&self, window: &ReportWindow) -> Result<AggregationResponse> {
            let key = window.month_key();
            self.calls.borrow_mut().push(key.clone());

            let mut failures = self.failures.borrow_mut();
            if *failures > 0 {
                *failures -= 1;
                return Err(ReportError::Io(io::Error::new(
                    io::ErrorKind::TimedOut,
                    "backend timed out",
                )));
            }

            self.responses
                .get(&key)
                .cloned()
                .ok_or_else(|| ReportError::IngestShape(format!("no data for {}", key)))
        }
    }

    fn runner(failures: u32) -> ReportRunner<FakeExecutor> {
        let builder = PivotReportBuilder::new(OpportunisticSet::new(["osg"]).unwrap());
        ReportRunner::new(FakeExecutor::new(failures), builder).with_backoff(Duration::ZERO)
    }

    fn march() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 17).unwrap()
    }

    // ── run ───────────────────────────────────────────────────────────────────

    #[test]
    fn test_run_fetches_current_then_previous() {
        let r = runner(0);
        let outcome = r.run(march(), None).unwrap();

        assert_eq!(r.executor().calls(), vec!["2024-03", "2024-02"]);
        assert_eq!(
            outcome.title,
            "Organizations' Usage of Sites: 2024-03-01 - 2024-03-31"
        );
        assert_eq!(outcome.windows[1].period, Period::Previous);

        let total = outcome.table.summary_row(SummaryRow::GrandTotal).unwrap();
        assert_eq!(outcome.table.cell("Total", total), Some(&Cell::Number(350.0)));
    }

    #[test]
    fn test_run_custom_title() {
        let outcome = runner(0).run(march(), Some("March usage")).unwrap();
        assert_eq!(outcome.title, "March usage");
    }

    // ── retry ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_transient_failures_are_retried() {
        let r = runner(2);
        r.run(march(), None).unwrap();
        // Two failures on the current window, then one call each.
        assert_eq!(
            r.executor().calls(),
            vec!["2024-03", "2024-03", "2024-03", "2024-02"]
        );
    }

    #[test]
    fn test_retries_exhausted() {
        let r = runner(5);
        let err = r.run(march(), None).unwrap_err();
        assert!(err.is_transient());
        assert_eq!(r.executor().calls().len(), MAX_FETCH_ATTEMPTS as usize);
    }

    #[test]
    fn test_shape_errors_are_not_retried() {
        let r = runner(0);
        let january = NaiveDate::from_ymd_opt(2024, 1, 10).unwrap();
        let err = r.run(january, None).unwrap_err();
        assert!(matches!(err, ReportError::IngestShape(_)));
        assert_eq!(r.executor().calls(), vec!["2024-01"]);
    }

    #[test]
    fn test_single_attempt() {
        let r = runner(1).with_max_attempts(0);
        assert!(r.run(march(), None).is_err());
        assert_eq!(r.executor().calls().len(), 1);
    }
}
