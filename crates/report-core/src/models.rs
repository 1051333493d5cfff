use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{ReportError, Result};

/// One of the two reporting periods compared by the report.
///
/// Ordering follows ingestion order: `Current < Previous`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    /// The month being reported on.
    Current,
    /// The month immediately before it.
    Previous,
}

impl Period {
    /// Both periods in ingestion order.
    pub const ALL: [Period; 2] = [Period::Current, Period::Previous];

    /// Slot of this period inside a `[current, previous]` pair.
    pub fn index(self) -> usize {
        match self {
            Period::Current => 0,
            Period::Previous => 1,
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Current => f.write_str("current"),
            Period::Previous => f.write_str("previous"),
        }
    }
}

/// A single core-hour figure for one organization at one site.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// Organization name, already case-folded.
    pub org: String,
    /// Site name as reported upstream.
    pub site: String,
    /// Core hours consumed.
    pub value: f64,
    /// Which period the figure belongs to.
    pub period: Period,
}

impl MetricSample {
    /// Build a sample, lower-casing the organization key.
    pub fn new(org: &str, site: impl Into<String>, value: f64, period: Period) -> Self {
        Self {
            org: org.to_lowercase(),
            site: site.into(),
            value,
            period,
        }
    }
}

// ── OpportunisticSet ──────────────────────────────────────────────────────────

/// Organizations whose usage is reported as the opportunistic subtotal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpportunisticSet {
    names: BTreeSet<String>,
}

impl OpportunisticSet {
    /// Build the set from configured names.
    ///
    /// Names are trimmed and lower-cased. An empty list, or one containing a
    /// blank name, is a configuration error.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = BTreeSet::new();
        for name in names {
            let name = name.as_ref().trim();
            if name.is_empty() {
                return Err(ReportError::Config(
                    "opportunistic organization names must not be blank".to_string(),
                ));
            }
            set.insert(name.to_lowercase());
        }
        if set.is_empty() {
            return Err(ReportError::Config(
                "no opportunistic organizations configured".to_string(),
            ));
        }
        Ok(Self { names: set })
    }

    /// Parse a comma-separated list such as `"osg, glow,hcc"`.
    pub fn parse_list(list: &str) -> Result<Self> {
        let names: Vec<&str> = list.split(',').filter(|s| !s.trim().is_empty()).collect();
        Self::new(names)
    }

    pub fn contains(&self, org: &str) -> bool {
        self.names.contains(org)
    }

    /// Names in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

// ── ReportWindow ──────────────────────────────────────────────────────────────

/// Calendar span covered by one period of the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportWindow {
    pub period: Period,
    /// First day of the month (inclusive).
    pub start: NaiveDate,
    /// Last day of the month (inclusive).
    pub end: NaiveDate,
}

impl ReportWindow {
    /// Month key used to locate stored results, e.g. `"2024-03"`.
    pub fn month_key(&self) -> String {
        self.start.format("%Y-%m").to_string()
    }
}

// ── Report table ──────────────────────────────────────────────────────────────

/// A single value in the finished report.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    /// Core hours or a percentage.
    Number(f64),
    /// The quantity has no meaning for this row.
    NotApplicable,
    /// A percentage whose denominator was zero.
    Undefined,
    /// Separator row filler.
    Blank,
    /// Row label; only appears in the `Site` column.
    Label(String),
}

impl Cell {
    /// The numeric value, if this cell holds one.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Cell::Number(v) => Some(*v),
            _ => None,
        }
    }
}

impl Serialize for Cell {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Cell::Number(v) => serializer.serialize_f64(*v),
            Cell::NotApplicable => serializer.serialize_str("N/A"),
            Cell::Undefined => serializer.serialize_str("NaN"),
            Cell::Blank => serializer.serialize_str(""),
            Cell::Label(s) => serializer.serialize_str(s),
        }
    }
}

/// Rows after the sites: grand total, separator, previous-month total and
/// percent change.
pub const SUMMARY_ROW_COUNT: usize = 4;

/// The summary rows that follow the site rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryRow {
    GrandTotal,
    PrevMonthTotal,
    PercentChange,
}

impl SummaryRow {
    fn offset(self) -> usize {
        match self {
            SummaryRow::GrandTotal => 0,
            SummaryRow::PrevMonthTotal => 2,
            SummaryRow::PercentChange => 3,
        }
    }
}

/// A named, row-aligned column of cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub cells: Vec<Cell>,
}

/// The finished pivot report: ordered columns of equal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportTable {
    columns: Vec<Column>,
}

impl ReportTable {
    /// Assemble a table from columns that all have the same number of cells.
    pub fn from_columns(columns: Vec<Column>) -> Self {
        debug_assert!(
            columns.windows(2).all(|w| w[0].cells.len() == w[1].cells.len()),
            "report columns must be row-aligned"
        );
        Self { columns }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Column names in presentation order.
    pub fn header(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.cells.len()).unwrap_or(0)
    }

    /// Cells of row `index` across all columns, in column order.
    pub fn row(&self, index: usize) -> Vec<&Cell> {
        self.columns.iter().filter_map(|c| c.cells.get(index)).collect()
    }

    pub fn cell(&self, column: &str, row: usize) -> Option<&Cell> {
        self.column(column).and_then(|c| c.cells.get(row))
    }

    /// Number of site rows, i.e. rows before the grand-total row.
    pub fn site_row_count(&self) -> usize {
        self.row_count().saturating_sub(SUMMARY_ROW_COUNT)
    }

    /// Locate a site row by its label.
    ///
    /// Only site rows are searched, so a site that shares a summary row's
    /// label still resolves to its own row.
    pub fn row_index(&self, site: &str) -> Option<usize> {
        let sites = self.site_row_count();
        self.columns.first().and_then(|c| {
            c.cells[..sites]
                .iter()
                .position(|cell| matches!(cell, Cell::Label(l) if l == site))
        })
    }

    /// Index of a summary row, found by position after the site rows.
    pub fn summary_row(&self, row: SummaryRow) -> Option<usize> {
        if self.row_count() < SUMMARY_ROW_COUNT {
            return None;
        }
        Some(self.site_row_count() + row.offset())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_ordering() {
        assert!(Period::Current < Period::Previous);
        assert_eq!(Period::Current.index(), 0);
        assert_eq!(Period::Previous.index(), 1);
    }

    #[test]
    fn test_metric_sample_lowercases_org() {
        let s = MetricSample::new("ATLAS", "BNL", 12.0, Period::Current);
        assert_eq!(s.org, "atlas");
        assert_eq!(s.site, "BNL");
    }

    #[test]
    fn test_opportunistic_set_normalises() {
        let set = OpportunisticSet::new(["OSG", " glow "]).unwrap();
        assert!(set.contains("osg"));
        assert!(set.contains("glow"));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["glow", "osg"]);
    }

    #[test]
    fn test_opportunistic_set_empty_is_config_error() {
        let err = OpportunisticSet::new(Vec::<String>::new()).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_opportunistic_set_blank_is_config_error() {
        let err = OpportunisticSet::new(["osg", "  "]).unwrap_err();
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn test_opportunistic_set_parse_list() {
        let set = OpportunisticSet::parse_list("osg, hcc,,sbgrid").unwrap();
        assert_eq!(set.len(), 3);
        assert!(OpportunisticSet::parse_list(" , ").is_err());
    }

    #[test]
    fn test_cell_serialization() {
        let cells = vec![
            Cell::Number(1.5),
            Cell::NotApplicable,
            Cell::Undefined,
            Cell::Blank,
            Cell::Label("Total".to_string()),
        ];
        let json = serde_json::to_string(&cells).unwrap();
        assert_eq!(json, r#"[1.5,"N/A","NaN","","Total"]"#);
    }

    #[test]
    fn test_table_lookup() {
        let labels = ["a", "Total", "Total", "", "Prev. Month Total", "Percent Change over Prev. Month"];
        let table = ReportTable::from_columns(vec![
            Column {
                name: "Site".to_string(),
                cells: labels
                    .iter()
                    .map(|l| if l.is_empty() { Cell::Blank } else { Cell::Label(l.to_string()) })
                    .collect(),
            },
            Column {
                name: "Total".to_string(),
                cells: vec![
                    Cell::Number(1.0),
                    Cell::Number(2.0),
                    Cell::Number(3.0),
                    Cell::Blank,
                    Cell::Number(4.0),
                    Cell::Number(5.0),
                ],
            },
        ]);
        assert_eq!(table.header(), vec!["Site", "Total"]);
        assert_eq!(table.row_count(), 6);
        assert_eq!(table.site_row_count(), 2);
        assert_eq!(table.cell("Total", 0), Some(&Cell::Number(1.0)));
        assert!(table.column("missing").is_none());

        // A site named like the grand-total row keeps its own row.
        assert_eq!(table.row_index("Total"), Some(1));
        assert_eq!(table.summary_row(SummaryRow::GrandTotal), Some(2));
        assert_eq!(table.summary_row(SummaryRow::PrevMonthTotal), Some(4));
        assert_eq!(table.summary_row(SummaryRow::PercentChange), Some(5));
        assert!(table.row_index("Prev. Month Total").is_none());
    }

    #[test]
    fn test_summary_row_on_short_table() {
        let table = ReportTable::from_columns(vec![Column {
            name: "Site".to_string(),
            cells: vec![Cell::Label("a".to_string())],
        }]);
        assert_eq!(table.site_row_count(), 0);
        assert!(table.summary_row(SummaryRow::GrandTotal).is_none());
        assert!(table.row_index("a").is_none());
    }
}
