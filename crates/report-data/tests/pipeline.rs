//! Stored results on disk through to the finished pivot table.

use report_core::models::{Cell, OpportunisticSet, SummaryRow};
use report_core::pivot::{
    PivotReportBuilder, OPP_TOTAL_COLUMN, PERCENT_CHANGE_COLUMN, PERCENT_OPP_COLUMN,
    PREV_OPP_TOTAL_COLUMN, TOTAL_COLUMN,
};
use report_data::analysis::analyze_usage;
use report_data::reader::{load_response, locate_month_file};
use tempfile::TempDir;

const CURRENT: &str = r#"{"aggregations": {"vo_bucket": {"buckets": [
    {"key": "OSG", "site_bucket": {"buckets": [
        {"key": "siteA", "sum_core_hours": {"value": 100.0}},
        {"key": "siteB", "sum_core_hours": {"value": 50.0}}
    ]}},
    {"key": "atlas", "site_bucket": {"buckets": [
        {"key": "siteA", "sum_core_hours": {"value": 200.0}}
    ]}}
]}}}"#;

const PREVIOUS: &str = r#"{"aggregations": {"vo_bucket": {"buckets": [
    {"key": "osg", "site_bucket": {"buckets": [
        {"key": "siteA", "sum_core_hours": {"value": 80.0}}
    ]}},
    {"key": "atlas", "site_bucket": {"buckets": [
        {"key": "siteA", "sum_core_hours": {"value": 150.0}}
    ]}},
    {"key": "dune", "site_bucket": {"buckets": [
        {"key": "siteA", "sum_core_hours": {"value": 999.0}}
    ]}}
]}}}"#;

fn number(cell: Option<&Cell>) -> f64 {
    cell.and_then(Cell::as_number).expect("numeric cell")
}

#[test]
fn test_worked_example_from_disk() {
    let tmp = TempDir::new().expect("tempdir");
    std::fs::write(tmp.path().join("siteusage-2024-03.json"), CURRENT).unwrap();
    std::fs::write(tmp.path().join("siteusage-2024-02.json"), PREVIOUS).unwrap();

    let current = load_response(&locate_month_file(tmp.path(), "2024-03").unwrap()).unwrap();
    let previous = load_response(&locate_month_file(tmp.path(), "2024-02").unwrap()).unwrap();
    let builder = PivotReportBuilder::new(OpportunisticSet::new(["osg"]).unwrap());

    let result = analyze_usage(&current, &previous, &builder).unwrap();
    let table = &result.table;

    assert_eq!(
        table.header(),
        vec![
            "Site",
            "Total",
            "Opportunistic Total",
            "osg",
            "Percent Opportunistic",
            "Prev. Month Opp. Total",
            "Percentage Change Month-Month",
            "atlas",
        ]
    );
    assert!(table.column("dune").is_none());

    let a = table.row_index("siteA").unwrap();
    assert_eq!(number(table.cell(TOTAL_COLUMN, a)), 300.0);
    assert_eq!(number(table.cell(OPP_TOTAL_COLUMN, a)), 100.0);
    assert!((number(table.cell(PERCENT_OPP_COLUMN, a)) - 33.33).abs() < 0.01);
    assert_eq!(number(table.cell(PREV_OPP_TOTAL_COLUMN, a)), 80.0);
    assert_eq!(number(table.cell(PERCENT_CHANGE_COLUMN, a)), 25.0);

    let b = table.row_index("siteB").unwrap();
    assert_eq!(number(table.cell(TOTAL_COLUMN, b)), 50.0);
    assert_eq!(number(table.cell(OPP_TOTAL_COLUMN, b)), 50.0);
    assert_eq!(number(table.cell(PERCENT_OPP_COLUMN, b)), 100.0);
    assert_eq!(number(table.cell(PREV_OPP_TOTAL_COLUMN, b)), 0.0);
    assert_eq!(number(table.cell(PERCENT_CHANGE_COLUMN, b)), 100.0);

    let total = table.summary_row(SummaryRow::GrandTotal).unwrap();
    assert_eq!(number(table.cell(TOTAL_COLUMN, total)), 350.0);

    let prev = table.summary_row(SummaryRow::PrevMonthTotal).unwrap();
    // dune's previous usage never reaches the report.
    assert_eq!(number(table.cell(TOTAL_COLUMN, prev)), 230.0);

    let change = table.summary_row(SummaryRow::PercentChange).unwrap();
    assert_eq!(number(table.cell("osg", change)), 87.5);
    assert_eq!(table.cell(PERCENT_OPP_COLUMN, change), Some(&Cell::NotApplicable));

    assert_eq!(result.metadata.ingest.dropped_samples, 1);
}

#[test]
fn test_org_columns_independent_of_input_order() {
    let forward = report_data::response::AggregationResponse::from_pairs(vec![
        ("zeta", vec![("s2", 1.0), ("s1", 2.0)]),
        ("alpha", vec![("s1", 3.0)]),
        ("osg", vec![("s2", 4.0)]),
    ]);
    let reversed = report_data::response::AggregationResponse::from_pairs(vec![
        ("osg", vec![("s2", 4.0)]),
        ("alpha", vec![("s1", 3.0)]),
        ("zeta", vec![("s1", 2.0), ("s2", 1.0)]),
    ]);
    let empty = report_data::response::AggregationResponse::from_pairs(
        Vec::<(&str, Vec<(&str, f64)>)>::new(),
    );
    let builder = PivotReportBuilder::new(OpportunisticSet::new(["osg"]).unwrap());

    let one = analyze_usage(&forward, &empty, &builder).unwrap().table;
    let two = analyze_usage(&reversed, &empty, &builder).unwrap().table;
    assert_eq!(one, two);
}
