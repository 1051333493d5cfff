//! CSV rendering.

use report_core::error::{ReportError, Result};
use report_core::formatting::format_cell;
use report_core::models::ReportTable;

use crate::DECIMALS;

/// Render the table as CSV: one header record, then one record per row.
pub fn render_csv(table: &ReportTable) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(Vec::new());

    wtr.write_record(table.header()).map_err(csv_error)?;
    for i in 0..table.row_count() {
        let record: Vec<String> = table
            .row(i)
            .into_iter()
            .map(|cell| format_cell(cell, DECIMALS))
            .collect();
        wtr.write_record(&record).map_err(csv_error)?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| ReportError::Render(format!("flushing CSV output: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| ReportError::Render(e.to_string()))
}

fn csv_error(e: csv::Error) -> ReportError {
    ReportError::Render(format!("writing CSV record: {}", e))
}
