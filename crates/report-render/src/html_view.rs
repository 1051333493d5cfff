//! HTML rendering, suitable for a mail body.

use report_core::formatting::format_cell;
use report_core::models::{Cell, ReportTable};

use crate::DECIMALS;

/// Render the table as a standalone HTML document.
pub fn render_html(table: &ReportTable, title: &str) -> String {
    let mut out = String::new();
    out.push_str("<html>\n<head><meta charset=\"utf-8\"><title>");
    out.push_str(&escape(title));
    out.push_str("</title></head>\n<body>\n<h2>");
    out.push_str(&escape(title));
    out.push_str("</h2>\n<table border=\"1\" cellpadding=\"4\">\n<tr>");
    for name in table.header() {
        out.push_str("<th>");
        out.push_str(&escape(name));
        out.push_str("</th>");
    }
    out.push_str("</tr>\n");

    for i in 0..table.row_count() {
        out.push_str("<tr>");
        for cell in table.row(i) {
            let align = match cell {
                Cell::Label(_) | Cell::Blank => "left",
                _ => "right",
            };
            out.push_str(&format!(
                "<td align=\"{}\">{}</td>",
                align,
                escape(&format_cell(cell, DECIMALS))
            ));
        }
        out.push_str("</tr>\n");
    }

    out.push_str("</table>\n</body>\n</html>\n");
    out
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
