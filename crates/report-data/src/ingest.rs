//! Feeds nested aggregation results into per-organization accumulators.
//!
//! The current period is ingested first and defines the report population:
//! the organizations and sites seen there. Previous-period samples outside
//! that population are dropped.

use std::collections::{BTreeMap, BTreeSet};

use report_core::accumulator::OrgAccumulator;
use report_core::error::{ReportError, Result};
use report_core::models::{MetricSample, Period};

use crate::response::AggregationResponse;

// ── IngestStats ───────────────────────────────────────────────────────────────

/// Sample counts for one ingest run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct IngestStats {
    /// Samples accumulated from the current period.
    pub current_samples: usize,
    /// Samples accumulated from the previous period.
    pub previous_samples: usize,
    /// Previous-period samples for an organization or site absent from the
    /// current period.
    pub dropped_samples: usize,
}

// ── IngestedUsage ─────────────────────────────────────────────────────────────

/// Finished ingest state, ready for the pivot builder.
#[derive(Debug, Clone)]
pub struct IngestedUsage {
    pub orgs: BTreeMap<String, OrgAccumulator>,
    /// Sites observed in the current period.
    pub sites: BTreeSet<String>,
    pub stats: IngestStats,
}

// ── BucketIngestor ────────────────────────────────────────────────────────────

/// Walks aggregation results period by period and accumulates their samples.
#[derive(Debug, Default)]
pub struct BucketIngestor {
    orgs: BTreeMap<String, OrgAccumulator>,
    sites: BTreeSet<String>,
    phase: Option<Period>,
    stats: IngestStats,
}

impl BucketIngestor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest one period's result.
    ///
    /// The whole result is validated before anything is accumulated, so a
    /// shape error leaves the ingestor unchanged.
    pub fn ingest(&mut self, period: Period, response: &AggregationResponse) -> Result<()> {
        self.check_order(period)?;
        let samples = Self::samples(period, response)?;
        // The phase advances even when the period has no samples.
        self.phase = Some(period);
        for sample in samples {
            self.record(sample)?;
        }
        Ok(())
    }

    /// Flatten `response` into samples, checking the nesting as we go.
    pub fn samples(period: Period, response: &AggregationResponse) -> Result<Vec<MetricSample>> {
        let orgs = response.orgs.as_ref().ok_or_else(|| {
            ReportError::IngestShape(format!("{} result has no organization buckets", period))
        })?;

        let mut samples = Vec::new();
        for org in &orgs.buckets {
            let sites = org.sites.as_ref().ok_or_else(|| {
                ReportError::IngestShape(format!(
                    "organization bucket \"{}\" has no site buckets",
                    org.key
                ))
            })?;
            for site in &sites.buckets {
                let value = site
                    .sum_core_hours
                    .as_ref()
                    .and_then(|m| m.value)
                    .ok_or_else(|| {
                        ReportError::IngestShape(format!(
                            "site bucket \"{}\" for \"{}\" has no core-hour value",
                            site.key, org.key
                        ))
                    })?;
                if !value.is_finite() {
                    return Err(ReportError::IngestShape(format!(
                        "site bucket \"{}\" for \"{}\" has non-finite value {}",
                        site.key, org.key, value
                    )));
                }
                samples.push(MetricSample::new(&org.key, site.key.clone(), value, period));
            }
        }
        Ok(samples)
    }

    /// Record a single sample.
    ///
    /// Returns `false` when a previous-period sample is dropped because its
    /// organization or site never appeared in the current period.
    pub fn record(&mut self, sample: MetricSample) -> Result<bool> {
        self.check_order(sample.period)?;
        self.phase = Some(sample.period);

        match sample.period {
            Period::Current => {
                self.orgs
                    .entry(sample.org.clone())
                    .or_insert_with(|| OrgAccumulator::new(&sample.org))
                    .add(&sample.site, sample.value, Period::Current)?;
                self.sites.insert(sample.site);
                self.stats.current_samples += 1;
                Ok(true)
            }
            Period::Previous => {
                let known_site = self.sites.contains(&sample.site);
                match self.orgs.get_mut(&sample.org) {
                    Some(acc) if known_site => {
                        acc.add(&sample.site, sample.value, Period::Previous)?;
                        self.stats.previous_samples += 1;
                        Ok(true)
                    }
                    _ => {
                        self.stats.dropped_samples += 1;
                        Ok(false)
                    }
                }
            }
        }
    }

    pub fn orgs(&self) -> impl Iterator<Item = &OrgAccumulator> {
        self.orgs.values()
    }

    pub fn sites(&self) -> &BTreeSet<String> {
        &self.sites
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    pub fn finish(self) -> IngestedUsage {
        IngestedUsage {
            orgs: self.orgs,
            sites: self.sites,
            stats: self.stats,
        }
    }

    fn check_order(&self, period: Period) -> Result<()> {
        match self.phase {
            Some(active) if period < active => Err(ReportError::PeriodOrder {
                active,
                attempted: period,
            }),
            _ => Ok(()),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
