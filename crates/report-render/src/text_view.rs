//! Plain-text rendering: a title line followed by an aligned table.

use report_core::formatting::format_cell;
use report_core::models::ReportTable;
use unicode_width::UnicodeWidthStr;

use crate::DECIMALS;

const COLUMN_GAP: &str = "  ";

/// Render the table as aligned plain text.
///
/// The first column (site labels) is left-aligned and every other column
/// right-aligned. Widths are measured in terminal cells, so wide
/// characters in site or organization names do not break alignment.
pub fn render_text(table: &ReportTable, title: &str) -> String {
    let header: Vec<String> = table.header().iter().map(|h| h.to_string()).collect();
    let rows: Vec<Vec<String>> = (0..table.row_count())
        .map(|i| {
            table
                .row(i)
                .into_iter()
                .map(|cell| format_cell(cell, DECIMALS))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = header
        .iter()
        .enumerate()
        .map(|(col, name)| {
            rows.iter()
                .filter_map(|r| r.get(col))
                .map(|s| s.width())
                .chain(std::iter::once(name.width()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let mut out = String::new();
    out.push_str(title);
    out.push_str("\n\n");

    out.push_str(&format_line(&header, &widths));
    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&format_line(&rule, &widths));
    for row in &rows {
        out.push_str(&format_line(row, &widths));
    }
    out
}

fn format_line(cells: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .enumerate()
        .map(|(col, (text, width))| {
            let fill = " ".repeat(width.saturating_sub(text.width()));
            if col == 0 {
                format!("{}{}", text, fill)
            } else {
                format!("{}{}", fill, text)
            }
        })
        .collect();
    let mut line = padded.join(COLUMN_GAP).trim_end().to_string();
    line.push('\n');
    line
}
