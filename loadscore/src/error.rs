use std::io;

use thiserror::Error;

/// A single line of the feed could not be read as a metric record.
///
/// Always recoverable: the line is skipped and the stream continues.
#[derive(Debug, Error)]
#[error("line {line}: {source}")]
pub struct DecodeError {
    /// 1-based position of the line in its input.
    pub line: usize,
    #[source]
    pub source: serde_json::Error,
}

/// Failures that stop a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read metrics input")]
    Io(#[from] io::Error),

    #[error("failed to render report")]
    Render(#[source] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn messages_leave_the_cause_to_the_source_chain() {
        let cause = serde_json::from_str::<u8>("x").unwrap_err();
        let cause_text = cause.to_string();
        let err = Error::Render(cause);
        assert_eq!(err.to_string(), "failed to render report");
        assert_eq!(err.source().unwrap().to_string(), cause_text);

        let err = Error::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "failed to read metrics input");
        assert_eq!(err.source().unwrap().to_string(), "gone");
    }
}
