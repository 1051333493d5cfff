//! Site × organization pivot of accumulated core hours.
//!
//! The table is built in two passes. [`PivotReportBuilder::layout`] fixes the
//! column order from the organization names alone; the second pass fills each
//! column from per-site sums computed once up front, so nothing depends on
//! the iteration order of the inputs.

use std::collections::BTreeSet;

use crate::accumulator::OrgAccumulator;
use crate::calculations::{percent_change, percent_of};
use crate::models::{Cell, Column, OpportunisticSet, Period, ReportTable};

// ── Column and row names ──────────────────────────────────────────────────────

pub const SITE_COLUMN: &str = "Site";
pub const TOTAL_COLUMN: &str = "Total";
pub const OPP_TOTAL_COLUMN: &str = "Opportunistic Total";
pub const PERCENT_OPP_COLUMN: &str = "Percent Opportunistic";
pub const PREV_OPP_TOTAL_COLUMN: &str = "Prev. Month Opp. Total";
pub const PERCENT_CHANGE_COLUMN: &str = "Percentage Change Month-Month";

pub const TOTAL_ROW: &str = "Total";
pub const PREV_TOTAL_ROW: &str = "Prev. Month Total";
pub const PERCENT_CHANGE_ROW: &str = "Percent Change over Prev. Month";

/// What a column holds, independent of its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Site,
    Total,
    OpportunisticTotal,
    PercentOpportunistic,
    PrevOpportunisticTotal,
    PercentChange,
    /// Index into the name-sorted organization list.
    Org(usize),
}

/// Ordered column plan produced by the first pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    entries: Vec<(String, ColumnKind)>,
}

impl ColumnLayout {
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn iter(&self) -> impl Iterator<Item = &(String, ColumnKind)> {
        self.entries.iter()
    }
}

// ── Per-site sums ─────────────────────────────────────────────────────────────

/// Sums over organizations for every site row, plus the grand totals.
struct SiteSums {
    total: Vec<f64>,
    opportunistic: Vec<f64>,
    prev_opportunistic: Vec<f64>,
}

impl SiteSums {
    fn grand(values: &[f64]) -> f64 {
        values.iter().sum()
    }
}

// ── PivotReportBuilder ────────────────────────────────────────────────────────

/// Turns finished accumulators into a [`ReportTable`].
#[derive(Debug, Clone)]
pub struct PivotReportBuilder {
    opportunistic: OpportunisticSet,
}

impl PivotReportBuilder {
    pub fn new(opportunistic: OpportunisticSet) -> Self {
        Self { opportunistic }
    }

    /// First pass: decide the column order for `orgs` (sorted by name).
    ///
    /// Opportunistic organizations sit right after `Opportunistic Total`, all
    /// others after the last fixed column, each group in ascending order.
    pub fn layout(&self, orgs: &[&OrgAccumulator]) -> ColumnLayout {
        let mut entries = vec![
            (SITE_COLUMN.to_string(), ColumnKind::Site),
            (TOTAL_COLUMN.to_string(), ColumnKind::Total),
            (OPP_TOTAL_COLUMN.to_string(), ColumnKind::OpportunisticTotal),
        ];
        let mut others = Vec::new();
        for (idx, org) in orgs.iter().enumerate() {
            let entry = (org.name().to_string(), ColumnKind::Org(idx));
            if self.opportunistic.contains(org.name()) {
                entries.push(entry);
            } else {
                others.push(entry);
            }
        }
        entries.push((PERCENT_OPP_COLUMN.to_string(), ColumnKind::PercentOpportunistic));
        entries.push((PREV_OPP_TOTAL_COLUMN.to_string(), ColumnKind::PrevOpportunisticTotal));
        entries.push((PERCENT_CHANGE_COLUMN.to_string(), ColumnKind::PercentChange));
        entries.extend(others);
        ColumnLayout { entries }
    }

    /// Build the full report for `orgs` over the current-period `sites`.
    pub fn build<'a, I>(&self, orgs: I, sites: &BTreeSet<String>) -> ReportTable
    where
        I: IntoIterator<Item = &'a OrgAccumulator>,
    {
        let mut orgs: Vec<&OrgAccumulator> = orgs.into_iter().collect();
        orgs.sort_by(|a, b| a.name().cmp(b.name()));
        let sites: Vec<&str> = sites.iter().map(String::as_str).collect();

        let layout = self.layout(&orgs);
        let org_cells: Vec<Vec<f64>> = orgs
            .iter()
            .map(|org| {
                sites
                    .iter()
                    .map(|site| org.site_value(site, Period::Current))
                    .collect()
            })
            .collect();
        let sums = self.site_sums(&orgs, &org_cells, &sites);

        let prev_total: f64 = orgs.iter().map(|o| o.total(Period::Previous)).sum();
        let prev_opp_total: f64 = orgs
            .iter()
            .filter(|o| self.opportunistic.contains(o.name()))
            .map(|o| o.total(Period::Previous))
            .sum();

        let columns = layout
            .iter()
            .map(|(name, kind)| {
                let cells = match *kind {
                    ColumnKind::Site => site_labels(&sites),
                    ColumnKind::Org(idx) => {
                        summed_column(&org_cells[idx], orgs[idx].total(Period::Previous))
                    }
                    ColumnKind::Total => summed_column(&sums.total, prev_total),
                    ColumnKind::OpportunisticTotal => {
                        summed_column(&sums.opportunistic, prev_opp_total)
                    }
                    ColumnKind::PercentOpportunistic => {
                        let mut cells: Vec<Cell> = sums
                            .opportunistic
                            .iter()
                            .zip(&sums.total)
                            .map(|(opp, total)| percent_of(*opp, *total))
                            .collect();
                        cells.push(percent_of(
                            SiteSums::grand(&sums.opportunistic),
                            SiteSums::grand(&sums.total),
                        ));
                        with_summary(cells, percent_of(prev_opp_total, prev_total), Cell::NotApplicable)
                    }
                    ColumnKind::PrevOpportunisticTotal => {
                        let mut cells: Vec<Cell> =
                            sums.prev_opportunistic.iter().copied().map(Cell::Number).collect();
                        cells.push(Cell::Number(SiteSums::grand(&sums.prev_opportunistic)));
                        with_summary(cells, Cell::NotApplicable, Cell::NotApplicable)
                    }
                    ColumnKind::PercentChange => {
                        let mut cells: Vec<Cell> = sums
                            .prev_opportunistic
                            .iter()
                            .zip(&sums.opportunistic)
                            .map(|(old, new)| Cell::Number(percent_change(*old, *new)))
                            .collect();
                        cells.push(Cell::Number(percent_change(
                            SiteSums::grand(&sums.prev_opportunistic),
                            SiteSums::grand(&sums.opportunistic),
                        )));
                        with_summary(cells, Cell::NotApplicable, Cell::NotApplicable)
                    }
                };
                Column {
                    name: name.clone(),
                    cells,
                }
            })
            .collect();

        ReportTable::from_columns(columns)
    }

    fn site_sums(
        &self,
        orgs: &[&OrgAccumulator],
        org_cells: &[Vec<f64>],
        sites: &[&str],
    ) -> SiteSums {
        let mut sums = SiteSums {
            total: vec![0.0; sites.len()],
            opportunistic: vec![0.0; sites.len()],
            prev_opportunistic: vec![0.0; sites.len()],
        };
        for (org, cells) in orgs.iter().zip(org_cells) {
            let opportunistic = self.opportunistic.contains(org.name());
            for (row, value) in cells.iter().enumerate() {
                sums.total[row] += value;
                if opportunistic {
                    sums.opportunistic[row] += value;
                    sums.prev_opportunistic[row] += org.site_value(sites[row], Period::Previous);
                }
            }
        }
        sums
    }
}

// ── Column helpers ────────────────────────────────────────────────────────────

fn site_labels(sites: &[&str]) -> Vec<Cell> {
    let mut cells: Vec<Cell> = sites.iter().map(|s| Cell::Label(s.to_string())).collect();
    cells.push(Cell::Label(TOTAL_ROW.to_string()));
    cells.push(Cell::Blank);
    cells.push(Cell::Label(PREV_TOTAL_ROW.to_string()));
    cells.push(Cell::Label(PERCENT_CHANGE_ROW.to_string()));
    cells
}

/// Site cells, their grand total, then the previous-month total and the
/// change from it to the grand total.
fn summed_column(site_values: &[f64], prev_total: f64) -> Vec<Cell> {
    let grand = SiteSums::grand(site_values);
    let mut cells: Vec<Cell> = site_values.iter().copied().map(Cell::Number).collect();
    cells.push(Cell::Number(grand));
    with_summary(
        cells,
        Cell::Number(prev_total),
        Cell::Number(percent_change(prev_total, grand)),
    )
}

/// Append the separator and the two summary rows.
fn with_summary(mut cells: Vec<Cell>, prev_month: Cell, change: Cell) -> Vec<Cell> {
    cells.push(Cell::Blank);
    cells.push(prev_month);
    cells.push(change);
    cells
}

// ── Tests ─────────────────────────────────────────────────────────────────────
