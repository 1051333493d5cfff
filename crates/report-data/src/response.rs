//! Typed form of the nested aggregation result returned by the usage backend.
//!
//! The backend groups usage by organization (`vo_bucket`), then by site
//! (`site_bucket`), and sums core hours per site (`sum_core_hours`). Fields
//! are decoded leniently; whether the nesting is complete is checked by the
//! ingestor, not here.

use serde::{Deserialize, Serialize};

use report_core::error::{ReportError, Result};

/// A list of terms buckets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BucketList<T> {
    #[serde(default = "Vec::new")]
    pub buckets: Vec<T>,
}

/// A summed metric.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    #[serde(default)]
    pub value: Option<f64>,
}

/// Core hours at one site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteBucket {
    pub key: String,
    #[serde(default)]
    pub sum_core_hours: Option<MetricValue>,
}

/// All sites for one organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrgBucket {
    pub key: String,
    #[serde(default, rename = "site_bucket")]
    pub sites: Option<BucketList<SiteBucket>>,
}

/// One period's aggregation result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregationResponse {
    #[serde(default, rename = "vo_bucket")]
    pub orgs: Option<BucketList<OrgBucket>>,
}

impl AggregationResponse {
    /// Decode a response document.
    ///
    /// Accepts either the aggregations object itself or a full search
    /// response that wraps it under `"aggregations"`.
    pub fn from_json(value: serde_json::Value) -> Result<Self> {
        let inner = match value {
            serde_json::Value::Object(mut map) if map.contains_key("aggregations") => map
                .remove("aggregations")
                .unwrap_or(serde_json::Value::Null),
            other => other,
        };
        serde_json::from_value(inner).map_err(|e| ReportError::IngestShape(e.to_string()))
    }

    /// Build a response from plain `(org, [(site, hours)])` pairs.
    pub fn from_pairs<O, S>(pairs: impl IntoIterator<Item = (O, Vec<(S, f64)>)>) -> Self
    where
        O: Into<String>,
        S: Into<String>,
    {
        let buckets = pairs
            .into_iter()
            .map(|(org, sites)| OrgBucket {
                key: org.into(),
                sites: Some(BucketList {
                    buckets: sites
                        .into_iter()
                        .map(|(site, hours)| SiteBucket {
                            key: site.into(),
                            sum_core_hours: Some(MetricValue { value: Some(hours) }),
                        })
                        .collect(),
                }),
            })
            .collect();
        Self {
            orgs: Some(BucketList { buckets }),
        }
    }
}
