//! loadscore — reduces a k6 JSON metrics feed to a single performance score.
//!
//! k6 (`k6 run --out json=output.json`) writes one JSON object per line: metric
//! declarations and, for every sample taken during the run, a `"Point"`
//! record. This crate reads such a feed once, front to back, and turns it into
//! a weighted score where fast responses are rewarded and blocked connections
//! and failed checks are penalized.
//!
//! # Architecture
//!
//! The pipeline is linear and single-pass:
//!
//! - [`decode`]: raw line → [`MetricRecord`]. Malformed lines are reported and
//!   skipped; they never stop the stream.
//! - [`classify`]: record → zero or more appends to a tracked series.
//! - [`Aggregate`]: owns the sample series of one run. [`LoadTestAggregate`]
//!   is the built-in implementation and is finalized into
//!   [`AveragedMetrics`] once the input is exhausted.
//! - [`Scorer`]: averages → [`NormalizedMetrics`] → [`ScoreBreakdown`].
//! - [`Report`]: the derived result of a run; a [`Reporter`] renders it.
//!
//! [`Pipeline`] glues the stages together:
//!
//! ```rust
//! use loadscore::{Pipeline, Reporter, TextReporter};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), loadscore::Error> {
//! let feed = concat!(
//!     r#"{"type":"Point","metric":"http_req_duration","data":{"value":500}}"#, "\n",
//!     r#"{"type":"Point","metric":"http_req_duration","data":{"value":500}}"#, "\n",
//! );
//! let report = Pipeline::builder().build().run(feed.as_bytes()).await?;
//! assert_eq!(format!("{:.4}", report.score), "50.0000");
//! TextReporter.report(&report).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Known gap
//!
//! The score formula weighs `http_req_failed` and normalizes
//! `http_req_connecting` and `http_reqs`, but no series collects them. They
//! are always zero (see [`score::UNTRACKED`]).

/// Sample series and their averages
pub mod aggregate;
/// Record classification
pub mod classify;
/// Line decoding
pub mod decode;
pub mod error;
/// Decoded records
pub mod metric;
/// Glue that runs a feed through every stage
pub mod pipeline;
/// Reports and Reporters
pub mod report;
/// Normalization and weighting
pub mod score;

pub use aggregate::{Aggregate, AveragedMetrics, LoadTestAggregate, MetricSeries};
pub use error::{DecodeError, Error};
pub use metric::{Metric, MetricRecord, TrackedMetric};
pub use pipeline::{Ingest, IngestStats, Pipeline};
pub use report::{JsonReporter, Report, Reporter, ScoreReport, TextReporter};
pub use score::{NormalizedMetrics, ScoreBreakdown, ScoreObserver, Scorer};

/// Attribute macros deriving the bounds of [`Metric`] and [`Aggregate`]
pub(crate) mod macros {
    pub use loadscore_macros::*;
}
