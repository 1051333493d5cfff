//! JSON rendering for downstream tooling.
//!
//! Unlike the other views, numbers are emitted unformatted.

use report_core::error::{ReportError, Result};
use report_core::models::{Cell, ReportTable};
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    columns: Vec<&'a str>,
    rows: Vec<Vec<&'a Cell>>,
}

/// Render the table as pretty-printed JSON: `{title, columns, rows}`.
pub fn render_json(table: &ReportTable, title: &str) -> Result<String> {
    let report = JsonReport {
        title,
        columns: table.header(),
        rows: (0..table.row_count()).map(|i| table.row(i)).collect(),
    };
    serde_json::to_string_pretty(&report).map_err(|e| ReportError::Render(e.to_string()))
}
