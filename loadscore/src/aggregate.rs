use crate::{
    Metric,
    classify::{Append, classify},
    macros::aggregate,
    metric::{MetricRecord, TrackedMetric},
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;

/// The `Aggregate` trait defines how [`Metric`] values are collected into an
/// intermediate, mergeable representation.
///
/// An aggregate only stores what is needed to derive statistics later. The
/// derived values (averages, normalized scores) are produced when the aggregate
/// is converted into its summary type once the input is exhausted.
///
/// # Example
/// ```rust
/// use loadscore::{Aggregate, MetricRecord};
///
/// #[derive(serde::Serialize, serde::Deserialize, PartialEq, PartialOrd, Debug, Clone)]
/// struct LineCount(u64);
///
/// impl Aggregate for LineCount {
///     type Metric = MetricRecord;
///
///     fn new() -> Self {
///         Self(0)
///     }
///
///     fn consume(&mut self, _: &Self::Metric) {
///         self.0 += 1;
///     }
///
///     fn merge(&mut self, other: Self) {
///         self.0 += other.0;
///     }
/// }
/// ```
///
/// # Implementor notes
/// - `merge` must be **associative** and **commutative** with respect to the
///   derived statistics, so partial aggregates can be combined in any order.
pub trait Aggregate
where
    Self: Serialize + DeserializeOwned + PartialOrd + PartialEq + Send + Sync + Debug + Clone,
{
    /// The metric type this aggregate summarizes.
    type Metric: Metric;

    /// Create a new, empty instance of the aggregate.
    fn new() -> Self;

    /// Aggregate multiple metrics into the current instance.
    ///
    /// This default implementation calls [`consume`](Aggregate::consume) for each metric.
    fn aggregate(&mut self, metrics: &[Self::Metric]) {
        metrics.iter().for_each(|m| self.consume(m));
    }

    /// Incorporate a single metric into the aggregate.
    fn consume(&mut self, metric: &Self::Metric);

    /// Combine two different aggregates into one.
    fn merge(&mut self, other: Self);
}

/// Samples collected for one tracked metric. Append-only.
#[aggregate]
pub struct MetricSeries {
    pub name: TrackedMetric,
    pub samples: Vec<f64>,
}

impl MetricSeries {
    pub fn new(name: TrackedMetric) -> Self {
        Self {
            name,
            samples: Vec::new(),
        }
    }

    pub fn push(&mut self, value: f64) {
        self.samples.push(value);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Arithmetic mean of the samples, `0` for an empty series.
    ///
    /// Samples are summed in ascending order, so the result does not depend on
    /// arrival order. If the plain sum overflows, each sample is divided by the
    /// count before summing.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let mut sorted = self.samples.clone();
        sorted.sort_by(f64::total_cmp);
        let count = sorted.len() as f64;

        let sum: f64 = sorted.iter().sum();
        if sum.is_finite() {
            sum / count
        } else {
            sorted.iter().map(|v| v / count).sum()
        }
    }
}

/// Per-run accumulator for the three tracked series.
///
/// Holds raw samples only; call [`finalize`](LoadTestAggregate::finalize) once
/// the whole feed has been consumed. Finalizing earlier yields averages over
/// the lines seen so far, which is not a meaningful score input.
#[aggregate]
pub struct LoadTestAggregate {
    pub http_req_duration: MetricSeries,
    pub http_req_blocked: MetricSeries,
    pub http_req_check_failed: MetricSeries,
}

impl LoadTestAggregate {
    pub fn series(&self, name: TrackedMetric) -> &MetricSeries {
        match name {
            TrackedMetric::HttpReqDuration => &self.http_req_duration,
            TrackedMetric::HttpReqBlocked => &self.http_req_blocked,
            TrackedMetric::HttpReqCheckFailed => &self.http_req_check_failed,
        }
    }

    fn series_mut(&mut self, name: TrackedMetric) -> &mut MetricSeries {
        match name {
            TrackedMetric::HttpReqDuration => &mut self.http_req_duration,
            TrackedMetric::HttpReqBlocked => &mut self.http_req_blocked,
            TrackedMetric::HttpReqCheckFailed => &mut self.http_req_check_failed,
        }
    }

    pub fn append(&mut self, name: TrackedMetric, value: f64) {
        self.series_mut(name).push(value);
    }

    /// Applies the appends for `record` and returns how many samples were added.
    pub fn ingest(&mut self, record: &MetricRecord) -> usize {
        let mut added = 0;
        for Append { target, value } in classify(record) {
            self.append(target, value);
            added += 1;
        }
        added
    }

    /// Total samples across all series.
    pub fn sample_count(&self) -> usize {
        TrackedMetric::ALL
            .into_iter()
            .map(|name| self.series(name).len())
            .sum()
    }

    pub fn finalize(self) -> AveragedMetrics {
        self.into()
    }
}

impl Default for LoadTestAggregate {
    fn default() -> Self {
        Self {
            http_req_duration: MetricSeries::new(TrackedMetric::HttpReqDuration),
            http_req_blocked: MetricSeries::new(TrackedMetric::HttpReqBlocked),
            http_req_check_failed: MetricSeries::new(TrackedMetric::HttpReqCheckFailed),
        }
    }
}

impl Aggregate for LoadTestAggregate {
    type Metric = MetricRecord;

    fn new() -> Self {
        LoadTestAggregate::default()
    }

    fn consume(&mut self, metric: &Self::Metric) {
        self.ingest(metric);
    }

    fn merge(&mut self, other: Self) {
        for series in [
            other.http_req_duration,
            other.http_req_blocked,
            other.http_req_check_failed,
        ] {
            self.series_mut(series.name).samples.extend(series.samples);
        }
    }
}

/// Average of each tracked series. Empty series average to `0`.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq)]
pub struct AveragedMetrics {
    pub http_req_duration: f64,
    pub http_req_blocked: f64,
    pub http_req_check_failed: f64,
}

impl From<LoadTestAggregate> for AveragedMetrics {
    fn from(value: LoadTestAggregate) -> Self {
        Self {
            http_req_duration: value.http_req_duration.average(),
            http_req_blocked: value.http_req_blocked.average(),
            http_req_check_failed: value.http_req_check_failed.average(),
        }
    }
}
