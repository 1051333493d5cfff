//! Per-organization running totals over the two reporting periods.

use std::collections::BTreeMap;

use crate::error::{ReportError, Result};
use crate::models::Period;

// ── PeriodTotals ──────────────────────────────────────────────────────────────

/// A `[current, previous]` pair of core-hour figures.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PeriodTotals([f64; 2]);

impl PeriodTotals {
    pub fn get(&self, period: Period) -> f64 {
        self.0[period.index()]
    }

    fn add(&mut self, period: Period, value: f64) {
        self.0[period.index()] += value;
    }
}

// ── OrgAccumulator ────────────────────────────────────────────────────────────

/// Usage accumulated for one organization.
///
/// The organization total for a period is kept up to date on every
/// [`add`](Self::add) rather than summed on read, so it always equals the sum
/// of the site figures recorded for that period.
#[derive(Debug, Clone)]
pub struct OrgAccumulator {
    name: String,
    active: Period,
    sites: BTreeMap<String, PeriodTotals>,
    total: PeriodTotals,
}

impl OrgAccumulator {
    /// Create an empty accumulator; the name is lower-cased.
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_lowercase(),
            active: Period::Current,
            sites: BTreeMap::new(),
            total: PeriodTotals::default(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The period this accumulator is currently recording.
    pub fn active_period(&self) -> Period {
        self.active
    }

    /// Add `value` core hours at `site` for `period`.
    ///
    /// Repeated calls for the same site accumulate. Recording `Previous`
    /// data moves the accumulator into the previous period for good; a later
    /// `Current` sample is rejected with [`ReportError::PeriodOrder`].
    pub fn add(&mut self, site: &str, value: f64, period: Period) -> Result<()> {
        if period < self.active {
            return Err(ReportError::PeriodOrder {
                active: self.active,
                attempted: period,
            });
        }
        self.active = period;

        match self.sites.get_mut(site) {
            Some(totals) => totals.add(period, value),
            None => {
                let mut totals = PeriodTotals::default();
                totals.add(period, value);
                self.sites.insert(site.to_string(), totals);
            }
        }
        self.total.add(period, value);
        Ok(())
    }

    /// Core hours recorded at `site` for `period`, or `0.0` if none were.
    pub fn site_value(&self, site: &str, period: Period) -> f64 {
        self.sites.get(site).map(|t| t.get(period)).unwrap_or(0.0)
    }

    /// Running organization total for `period`.
    pub fn total(&self, period: Period) -> f64 {
        self.total.get(period)
    }

    /// Whether any sample has been recorded at `site`.
    pub fn has_site(&self, site: &str) -> bool {
        self.sites.contains_key(site)
    }

    /// Sites with recorded usage, ascending.
    pub fn sites(&self) -> impl Iterator<Item = &str> {
        self.sites.keys().map(String::as_str)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn site_sum(acc: &OrgAccumulator, period: Period) -> f64 {
        acc.sites().map(|s| acc.site_value(s, period)).sum()
    }

    #[test]
    fn test_new_lowercases_name() {
        let acc = OrgAccumulator::new("GlueX");
        assert_eq!(acc.name(), "gluex");
        assert_eq!(acc.active_period(), Period::Current);
    }

    #[test]
    fn test_add_updates_site_and_total() {
        let mut acc = OrgAccumulator::new("osg");
        acc.add("siteA", 100.0, Period::Current).unwrap();
        acc.add("siteB", 50.0, Period::Current).unwrap();

        assert_eq!(acc.site_value("siteA", Period::Current), 100.0);
        assert_eq!(acc.site_value("siteB", Period::Current), 50.0);
        assert_eq!(acc.total(Period::Current), 150.0);
        assert_eq!(acc.total(Period::Previous), 0.0);
    }

    #[test]
    fn test_repeated_add_accumulates() {
        let mut once = OrgAccumulator::new("osg");
        once.add("siteA", 40.0, Period::Current).unwrap();

        let mut twice = OrgAccumulator::new("osg");
        twice.add("siteA", 40.0, Period::Current).unwrap();
        twice.add("siteA", 40.0, Period::Current).unwrap();

        assert_eq!(
            twice.site_value("siteA", Period::Current),
            2.0 * once.site_value("siteA", Period::Current)
        );
        assert_eq!(twice.total(Period::Current), 80.0);
    }

    #[test]
    fn test_site_value_defaults_to_zero() {
        let mut acc = OrgAccumulator::new("osg");
        acc.add("siteA", 10.0, Period::Current).unwrap();
        assert_eq!(acc.site_value("nowhere", Period::Current), 0.0);
        assert_eq!(acc.site_value("siteA", Period::Previous), 0.0);
    }

    #[test]
    fn test_total_matches_site_sum_after_every_add() {
        let mut acc = OrgAccumulator::new("atlas");
        let samples = [
            ("siteA", 12.5, Period::Current),
            ("siteB", 7.25, Period::Current),
            ("siteA", 3.0, Period::Current),
            ("siteA", 9.0, Period::Previous),
            ("siteC", 1.5, Period::Previous),
        ];
        for (site, value, period) in samples {
            acc.add(site, value, period).unwrap();
            for p in Period::ALL {
                assert!((acc.total(p) - site_sum(&acc, p)).abs() < 1e-9);
            }
        }
    }

    #[test]
    fn test_previous_period_is_monotonic() {
        let mut acc = OrgAccumulator::new("osg");
        acc.add("siteA", 1.0, Period::Current).unwrap();
        acc.add("siteA", 2.0, Period::Previous).unwrap();
        assert_eq!(acc.active_period(), Period::Previous);

        let err = acc.add("siteA", 3.0, Period::Current).unwrap_err();
        assert!(matches!(
            err,
            ReportError::PeriodOrder {
                active: Period::Previous,
                attempted: Period::Current
            }
        ));
        // Rejected sample leaves the totals untouched.
        assert_eq!(acc.total(Period::Current), 1.0);
    }

    #[test]
    fn test_previous_first_sight_keeps_current_zero() {
        let mut acc = OrgAccumulator::new("osg");
        acc.add("siteA", 5.0, Period::Previous).unwrap();
        assert_eq!(acc.site_value("siteA", Period::Current), 0.0);
        assert_eq!(acc.site_value("siteA", Period::Previous), 5.0);
    }
}
