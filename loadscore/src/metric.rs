use std::fmt::{self, Debug};

use serde::{Deserialize, Serialize};

use crate::macros::metric;

/// A `Metric` is a single observation read from a load-test metrics feed.
///
/// Metrics are the most granular level of data the crate deals with. Each one
/// is classified, folded into an [`crate::Aggregate`] and then dropped; nothing
/// keeps a reference to an individual metric once it has been consumed.
///
/// ## Design principles
/// - **Cheap to construct:** one metric is built for every input line.
/// - **Comparable:** metrics support [`PartialEq`] and [`PartialOrd`] so tests
///   and tooling can compare them directly.
/// - **Thread-safe and clonable:** metrics must be `Send`, `Sync`, and `Clone`.
///
/// The [`metric`](crate::macros::metric) attribute derives everything required:
///
/// ```rust, ignore
/// #[metric]
/// pub struct Latency {
///     pub millis: f64,
/// }
/// ```
pub trait Metric
where
    Self: PartialOrd + PartialEq + Send + Sync + Clone + Debug,
{
}

/// The metric names that own a sample series.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TrackedMetric {
    HttpReqDuration,
    HttpReqBlocked,
    HttpReqCheckFailed,
}

impl TrackedMetric {
    pub const ALL: [TrackedMetric; 3] = [
        TrackedMetric::HttpReqDuration,
        TrackedMetric::HttpReqBlocked,
        TrackedMetric::HttpReqCheckFailed,
    ];

    /// Name as it appears in the `metric` field of the feed.
    pub fn as_str(self) -> &'static str {
        match self {
            TrackedMetric::HttpReqDuration => "http_req_duration",
            TrackedMetric::HttpReqBlocked => "http_req_blocked",
            TrackedMetric::HttpReqCheckFailed => "http_req_check_failed",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == name)
    }
}

impl fmt::Display for TrackedMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Payload of a record. Only `value` is read; timestamps and tags are ignored.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, PartialOrd)]
pub struct PointData {
    /// Absent on `"Metric"` declaration lines.
    pub value: Option<f64>,
}

/// One decoded line of the feed, in its wire shape:
/// `{"type": "Point", "metric": "http_req_duration", "data": {"value": 12.5}}`.
#[metric]
pub struct MetricRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(rename = "metric")]
    pub metric_name: String,
    pub data: PointData,
}

impl MetricRecord {
    pub fn new(kind: impl Into<String>, metric_name: impl Into<String>, value: f64) -> Self {
        Self {
            kind: kind.into(),
            metric_name: metric_name.into(),
            data: PointData { value: Some(value) },
        }
    }

    pub fn value(&self) -> Option<f64> {
        self.data.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracked_names_match_feed_names() {
        for m in TrackedMetric::ALL {
            assert_eq!(TrackedMetric::from_name(m.as_str()), Some(m));
            assert_eq!(serde_json::to_value(m).unwrap(), m.as_str());
        }
    }

    #[test]
    fn untracked_names_are_rejected() {
        assert_eq!(TrackedMetric::from_name("checks"), None);
        assert_eq!(TrackedMetric::from_name("http_req_failed"), None);
        assert_eq!(TrackedMetric::from_name("HTTP_REQ_DURATION"), None);
    }

    #[test]
    fn record_serializes_in_wire_shape() {
        let record = MetricRecord::new("Point", "http_req_blocked", 3.0);
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "Point");
        assert_eq!(json["metric"], "http_req_blocked");
        assert_eq!(json["data"]["value"], 3.0);
    }
}
