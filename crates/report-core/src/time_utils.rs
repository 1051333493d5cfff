use std::sync::OnceLock;

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;

use crate::error::{ReportError, Result};
use crate::models::{Period, ReportWindow};

// ── Date parsing ──────────────────────────────────────────────────────────────

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(\d{4})[-/](\d{2})[-/](\d{2})(?:[ T](\d{2}):(\d{2}):(\d{2}))?$")
            .expect("static date regex")
    })
}

/// Parse a report date.
///
/// Accepts `yyyy-mm-dd` or `yyyy/mm/dd`, optionally followed by a
/// `HH:MM:SS` time which is validated and then discarded.
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let trimmed = s.trim();
    let caps = date_pattern()
        .captures(trimmed)
        .ok_or_else(|| ReportError::InvalidDate(s.to_string()))?;

    let field = |i: usize| -> u32 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };

    if caps.get(4).is_some() && (field(4) > 23 || field(5) > 59 || field(6) > 59) {
        return Err(ReportError::InvalidDate(s.to_string()));
    }

    NaiveDate::from_ymd_opt(field(1) as i32, field(2), field(3))
        .ok_or_else(|| ReportError::InvalidDate(s.to_string()))
}

// ── Month windows ─────────────────────────────────────────────────────────────

/// First and last day of the month containing `date`.
///
/// `2016-12-05` → (`2016-12-01`, `2016-12-31`).
pub fn month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = date.with_day(1).unwrap_or(date);
    let (year, month) = if start.month() == 12 {
        (start.year() + 1, 1)
    } else {
        (start.year(), start.month() + 1)
    };
    let end = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|next| next - Duration::days(1))
        .unwrap_or(start);
    (start, end)
}

/// First and last day of the month before the one containing `date`.
///
/// `2016-12-05` → (`2016-11-01`, `2016-11-30`).
pub fn prev_month_range(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let (start, _) = month_range(date);
    month_range(start - Duration::days(1))
}

/// The current and previous report windows for a report dated `date`.
pub fn report_windows(date: NaiveDate) -> [ReportWindow; 2] {
    let (cur_start, cur_end) = month_range(date);
    let (prev_start, prev_end) = prev_month_range(date);
    [
        ReportWindow {
            period: Period::Current,
            start: cur_start,
            end: cur_end,
        },
        ReportWindow {
            period: Period::Previous,
            start: prev_start,
            end: prev_end,
        },
    ]
}

/// Default report title for the month starting at `window`.
pub fn report_title(window: &ReportWindow) -> String {
    format!(
        "Organizations' Usage of Sites: {} - {}",
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
