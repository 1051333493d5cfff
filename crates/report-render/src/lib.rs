//! Presentation layer for the site usage report.
//!
//! Turns a finished [`ReportTable`] into text, CSV, HTML or JSON. Numeric
//! cells are printed with two decimals and thousands separators; sentinels
//! keep their fixed spellings.

pub mod csv_view;
pub mod html_view;
pub mod json_view;
pub mod text_view;

use std::fmt;
use std::str::FromStr;

use report_core::error::{ReportError, Result};
use report_core::models::ReportTable;

pub use csv_view::render_csv;
pub use html_view::render_html;
pub use json_view::render_json;
pub use text_view::render_text;

/// Decimal places used for every numeric cell.
pub const DECIMALS: u32 = 2;

/// Output format selected on the command line or in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Csv,
    Html,
    Json,
}

impl FromStr for ReportFormat {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "text" | "txt" => Ok(ReportFormat::Text),
            "csv" => Ok(ReportFormat::Csv),
            "html" => Ok(ReportFormat::Html),
            "json" => Ok(ReportFormat::Json),
            other => Err(ReportError::Config(format!(
                "unknown report format \"{}\" (expected text, csv, html or json)",
                other
            ))),
        }
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReportFormat::Text => "text",
            ReportFormat::Csv => "csv",
            ReportFormat::Html => "html",
            ReportFormat::Json => "json",
        };
        f.write_str(name)
    }
}

/// Render `table` under `title` in the requested format.
pub fn render(table: &ReportTable, format: ReportFormat, title: &str) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(table, title)),
        ReportFormat::Csv => render_csv(table),
        ReportFormat::Html => Ok(render_html(table, title)),
        ReportFormat::Json => render_json(table, title),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use report_core::models::{Cell, Column, ReportTable};

    /// A small table exercising every kind of cell.
    pub fn sample_table() -> ReportTable {
        ReportTable::from_columns(vec![
            Column {
                name: "Site".to_string(),
                cells: vec![
                    Cell::Label("siteA".to_string()),
                    Cell::Label("siteB".to_string()),
                    Cell::Blank,
                    Cell::Label("Total".to_string()),
                ],
            },
            Column {
                name: "Total".to_string(),
                cells: vec![
                    Cell::Number(1234.5),
                    Cell::Number(50.0),
                    Cell::Blank,
                    Cell::Number(1284.5),
                ],
            },
            Column {
                name: "Percent Opportunistic".to_string(),
                cells: vec![
                    Cell::Number(33.333),
                    Cell::Undefined,
                    Cell::Blank,
                    Cell::NotApplicable,
                ],
            },
        ])
    }
}
