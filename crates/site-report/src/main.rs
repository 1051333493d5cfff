mod bootstrap;
mod delivery;

use anyhow::{Context, Result};
use report_core::models::{Cell, SummaryRow};
use report_core::pivot::{PivotReportBuilder, TOTAL_COLUMN};
use report_core::settings::Settings;
use report_render::{render, ReportFormat};
use report_runtime::{FileQueryExecutor, ReportRunner};

use crate::delivery::{deliver, DeliveryTarget};

fn main() -> Result<()> {
    let settings = Settings::load()?;

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("site-report v{} starting", env!("CARGO_PKG_VERSION"));

    // Configuration problems surface before any data is read.
    let format: ReportFormat = settings.format.parse()?;
    let opportunistic = settings.opportunistic_set()?;
    let date = settings.report_date()?;
    let data_dir = settings.data_dir();

    tracing::info!(
        format = %format,
        opportunistic = opportunistic.len(),
        data_dir = %data_dir.display(),
        "report settings"
    );

    let runner = ReportRunner::new(
        FileQueryExecutor::new(&data_dir),
        PivotReportBuilder::new(opportunistic),
    );
    let outcome = runner
        .run(date, settings.title.as_deref())
        .with_context(|| format!("building report for {}", date.format("%Y-%m")))?;

    let stats = outcome.metadata.ingest;
    tracing::info!(
        orgs = outcome.metadata.orgs_reported,
        sites = outcome.metadata.sites_reported,
        current_samples = stats.current_samples,
        previous_samples = stats.previous_samples,
        dropped_samples = stats.dropped_samples,
        "report built"
    );
    let grand_total = outcome
        .table
        .summary_row(SummaryRow::GrandTotal)
        .and_then(|row| outcome.table.cell(TOTAL_COLUMN, row))
        .and_then(Cell::as_number);
    if let Some(core_hours) = grand_total {
        tracing::info!(core_hours, "grand total for the report month");
    }

    let body = render(&outcome.table, format, &outcome.title)?;

    let target = DeliveryTarget {
        output: settings.output.as_deref(),
        recipients: &settings.recipients,
        dry_run: settings.dry_run,
    };
    let delivery = deliver(&outcome.title, &body, &target, &mut std::io::stdout().lock())?;
    tracing::debug!(?delivery, "done");

    Ok(())
}
