//! Line decoding.
//!
//! Every line of a k6 `--out json` feed is a self-contained JSON object. A line
//! that cannot be decoded yields a [`DecodeError`] and nothing else; the caller
//! decides how to report it and keeps reading.

use crate::{error::DecodeError, metric::MetricRecord};

/// Decodes one raw line. `line` is the 1-based position used in the error.
///
/// A trailing `\r` is ignored so CRLF files decode the same as LF ones.
pub fn decode_line(raw: &[u8], line: usize) -> Result<MetricRecord, DecodeError> {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    serde_json::from_slice(raw).map_err(|source| DecodeError { line, source })
}

/// Decodes a sequence of lines, numbering them from 1.
///
/// Malformed lines are yielded as `Err` items rather than ending the
/// iteration.
pub fn decode_lines<I>(lines: I) -> impl Iterator<Item = Result<MetricRecord, DecodeError>>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    lines
        .into_iter()
        .enumerate()
        .map(|(i, raw)| decode_line(raw.as_ref(), i + 1))
}
