//! Decides which series a decoded record feeds.

use crate::metric::{MetricRecord, TrackedMetric};

/// `type` tag of a sample emitted during the run.
pub const POINT_KIND: &str = "Point";
/// Metric name k6 uses for `check()` outcomes; a value of `0` is a failed check.
pub const CHECKS_METRIC: &str = "checks";

/// Instruction to push `value` onto the series for `target`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Append {
    pub target: TrackedMetric,
    pub value: f64,
}

/// Classifies a record into zero, one or two appends.
///
/// The two rules are independent: a `"Point"` sample of a tracked metric is
/// appended to its own series, and a failed `checks` sample counts as one
/// check failure whatever its `type`.
pub fn classify(record: &MetricRecord) -> impl Iterator<Item = Append> + use<> {
    let value = record.value();

    let point = value.and_then(|value| {
        if record.kind != POINT_KIND {
            return None;
        }
        TrackedMetric::from_name(&record.metric_name).map(|target| Append { target, value })
    });

    let failed_check = value
        .filter(|v| record.metric_name == CHECKS_METRIC && *v == 0.0)
        .map(|_| Append {
            target: TrackedMetric::HttpReqCheckFailed,
            value: 1.0,
        });

    point.into_iter().chain(failed_check)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn appends(record: &MetricRecord) -> Vec<Append> {
        classify(record).collect()
    }

    #[test]
    fn point_of_tracked_metric_is_appended() {
        let record = MetricRecord::new("Point", "http_req_duration", 42.0);
        assert_eq!(
            appends(&record),
            vec![Append {
                target: TrackedMetric::HttpReqDuration,
                value: 42.0
            }]
        );
    }

    #[test]
    fn non_point_kind_is_ignored() {
        let record = MetricRecord::new("Metric", "http_req_blocked", 42.0);
        assert!(appends(&record).is_empty());
    }

    #[test]
    fn untracked_metric_is_ignored() {
        for name in ["http_reqs", "http_req_failed", "http_req_connecting", "vus"] {
            assert!(appends(&MetricRecord::new("Point", name, 1.0)).is_empty());
        }
    }

    #[test]
    fn failed_check_counts_once_regardless_of_kind() {
        for kind in ["Point", "Metric", "anything"] {
            let record = MetricRecord::new(kind, "checks", 0.0);
            assert_eq!(
                appends(&record),
                vec![Append {
                    target: TrackedMetric::HttpReqCheckFailed,
                    value: 1.0
                }]
            );
        }
    }

    #[test]
    fn passed_check_is_ignored() {
        assert!(appends(&MetricRecord::new("Point", "checks", 1.0)).is_empty());
    }

    #[test]
    fn check_failed_series_can_be_fed_directly() {
        let record = MetricRecord::new("Point", "http_req_check_failed", 3.0);
        assert_eq!(
            appends(&record),
            vec![Append {
                target: TrackedMetric::HttpReqCheckFailed,
                value: 3.0
            }]
        );
    }

    #[test]
    fn record_without_value_is_ignored() {
        let mut record = MetricRecord::new("Point", "checks", 0.0);
        record.data.value = None;
        assert!(appends(&record).is_empty());
    }
}
