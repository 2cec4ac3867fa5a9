use std::path::Path;

use serde::{Deserialize, Serialize};
use tokio::{
    fs::File,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use typed_builder::TypedBuilder;

use crate::{
    aggregate::{Aggregate, LoadTestAggregate},
    decode::decode_line,
    error::{DecodeError, Result},
    report::ScoreReport,
    score::{Scorer, TracingObserver},
};

/// Counters describing what happened while reading the feed.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines read, malformed ones included.
    pub lines: usize,
    /// Lines decoded into a record.
    pub records: usize,
    /// Lines skipped because they could not be decoded.
    pub skipped: usize,
    /// Samples appended across all series.
    pub samples: usize,
}

/// Single-writer state of one run: the aggregate plus its counters.
///
/// Lines are consumed strictly in arrival order. Several inputs can be read
/// one after the other into the same `Ingest`.
#[derive(Debug, Clone, Default)]
pub struct Ingest {
    aggregate: LoadTestAggregate,
    stats: IngestStats,
}

impl Ingest {
    pub fn new() -> Self {
        Self {
            aggregate: LoadTestAggregate::new(),
            stats: IngestStats::default(),
        }
    }

    pub fn aggregate(&self) -> &LoadTestAggregate {
        &self.aggregate
    }

    pub fn stats(&self) -> IngestStats {
        self.stats
    }

    /// Decodes and classifies one line, returning how many samples it added.
    ///
    /// A malformed line only bumps the `skipped` counter.
    pub fn push_line(&mut self, raw: &[u8], line: usize) -> Result<usize, DecodeError> {
        self.stats.lines += 1;
        match decode_line(raw, line) {
            Ok(record) => {
                let added = self.aggregate.ingest(&record);
                self.stats.records += 1;
                self.stats.samples += added;
                Ok(added)
            }
            Err(err) => {
                self.stats.skipped += 1;
                Err(err)
            }
        }
    }

    fn consume_line(&mut self, source: &str, raw: &[u8], line: usize) {
        if let Err(err) = self.push_line(raw, line) {
            tracing::warn!(source, line = err.line, error = %err.source, "Skipping malformed line");
        }
    }

    /// Consumes an in-memory sequence of lines.
    pub fn lines<I>(&mut self, source: &str, lines: I)
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        for (i, raw) in lines.into_iter().enumerate() {
            self.consume_line(source, raw.as_ref(), i + 1);
        }
    }

    /// Consumes a reader until end of stream.
    ///
    /// Only I/O failures of the reader abort; bad encoding or bad JSON on a
    /// line is skipped like any other malformed line.
    pub async fn read<R>(&mut self, source: &str, reader: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut segments = reader.split(b'\n');
        let mut line = 0;
        while let Some(raw) = segments.next_segment().await? {
            line += 1;
            self.consume_line(source, &raw, line);
        }
        tracing::debug!(source, lines = line, "Reached end of input");
        Ok(())
    }

    pub async fn read_path(&mut self, path: &Path) -> Result<()> {
        tracing::info!("Reading metrics from {}...", path.display());
        let file = File::open(path).await?;
        self.read(&path.display().to_string(), BufReader::new(file))
            .await
    }
}

/// Glue that turns a metrics feed into a [`ScoreReport`].
///
/// ```rust
/// use loadscore::Pipeline;
///
/// let report = Pipeline::builder().name("smoke").build().run_lines([
///     r#"{"type":"Point","metric":"http_req_duration","data":{"value":500}}"#,
///     r#"{"type":"Point","metric":"http_req_duration","data":{"value":500}}"#,
/// ]);
/// assert_eq!(report.score, 50.0);
/// ```
#[derive(Debug, Clone, TypedBuilder)]
pub struct Pipeline {
    #[builder(setter(into), default = String::from("load test"))]
    pub name: String,
    #[builder(default)]
    pub scorer: Scorer,
}

impl Pipeline {
    /// Finalizes a finished ingest and scores it. Intermediate values are
    /// emitted as `debug` events.
    pub fn report(&self, ingest: Ingest) -> ScoreReport {
        let Ingest { aggregate, stats } = ingest;
        tracing::info!(
            lines = stats.lines,
            skipped = stats.skipped,
            samples = stats.samples,
            "Processing results..."
        );
        let averaged = aggregate.finalize();
        let evaluation = self.scorer.evaluate(&averaged, &mut TracingObserver);
        tracing::info!("Done scoring {}!", self.name);
        ScoreReport::new(self.name.clone(), stats, averaged, evaluation)
    }

    pub fn run_lines<I>(&self, lines: I) -> ScoreReport
    where
        I: IntoIterator,
        I::Item: AsRef<[u8]>,
    {
        let mut ingest = Ingest::new();
        ingest.lines(&self.name, lines);
        self.report(ingest)
    }

    pub async fn run<R>(&self, reader: R) -> Result<ScoreReport>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut ingest = Ingest::new();
        ingest.read(&self.name, reader).await?;
        Ok(self.report(ingest))
    }
}
