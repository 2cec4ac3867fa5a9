use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::future::Future;
use tokio::io::AsyncWriteExt;

use crate::{
    Aggregate,
    aggregate::{AveragedMetrics, LoadTestAggregate},
    error::{Error, Result},
    pipeline::IngestStats,
    score::{Evaluation, NormalizedMetrics, ScoreBreakdown, Scorer},
};

/// A [`Report`] is the processed form of an [`Aggregate`].
///
/// Reports hold derived values (averages, normalized quantities, the score)
/// and nothing else. They do no I/O; rendering them is the job of a
/// [`Reporter`].
pub trait Report<A>
where
    Self: Send + Sync + Debug + From<A> + Serialize + DeserializeOwned,
    A: Aggregate,
{
}

/// A [`Reporter`] consumes a [`Report`] and performs the side effect of
/// presenting it.
///
/// Reporters are the I/O boundary of the crate: everything up to the report is
/// pure, so the same report can be rendered by several reporters.
pub trait Reporter<A: Aggregate, R: Report<A>> {
    fn report(&self, report: &R) -> impl Future<Output = Result<()>>;
}

/// Everything derived from one run.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ScoreReport {
    pub name: String,
    pub stats: IngestStats,
    pub averaged: AveragedMetrics,
    pub normalized: NormalizedMetrics,
    pub breakdown: ScoreBreakdown,
    /// Final score, `>= 0`.
    pub score: f64,
}

impl ScoreReport {
    pub fn new(
        name: String,
        stats: IngestStats,
        averaged: AveragedMetrics,
        evaluation: Evaluation,
    ) -> Self {
        Self {
            name,
            stats,
            averaged,
            normalized: evaluation.normalized,
            breakdown: evaluation.breakdown,
            score: evaluation.breakdown.score,
        }
    }
}

/// Scores the aggregate with the default weights and scales. Line counters are
/// unknown at this point, only the sample count is filled in.
impl From<LoadTestAggregate> for ScoreReport {
    fn from(value: LoadTestAggregate) -> Self {
        let stats = IngestStats {
            samples: value.sample_count(),
            ..Default::default()
        };
        let averaged = value.finalize();
        let evaluation = Scorer::default().evaluate(&averaged, &mut ());
        Self::new(String::new(), stats, averaged, evaluation)
    }
}

impl Report<LoadTestAggregate> for ScoreReport {}

async fn write_stdout(rendered: &str) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(rendered.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}

/// Human readable breakdown, four fractional digits everywhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextReporter;

impl TextReporter {
    pub fn render(&self, report: &ScoreReport) -> String {
        let b = &report.breakdown;
        format!(
            "+ Duration: {:.4}\n\
             - Blocked: {:.4}\n\
             - Failed: {:.4}\n\
             - Check Failed: {:.4}\n\
             -- Negative Sum: {:.4}\n\
             ++ Positive Sum: {:.4}\n\
             ## Final Score: {:.4}\n",
            b.duration,
            b.blocked,
            b.failed,
            b.check_failed,
            b.negative_sum,
            b.positive_sum,
            report.score,
        )
    }
}

impl Reporter<LoadTestAggregate, ScoreReport> for TextReporter {
    async fn report(&self, report: &ScoreReport) -> Result<()> {
        write_stdout(&self.render(report)).await
    }
}

/// The whole report as one pretty-printed JSON document.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonReporter;

impl JsonReporter {
    pub fn render(&self, report: &ScoreReport) -> Result<String> {
        let mut rendered = serde_json::to_string_pretty(report).map_err(Error::Render)?;
        rendered.push('\n');
        Ok(rendered)
    }
}

impl Reporter<LoadTestAggregate, ScoreReport> for JsonReporter {
    async fn report(&self, report: &ScoreReport) -> Result<()> {
        write_stdout(&self.render(report)?).await
    }
}
