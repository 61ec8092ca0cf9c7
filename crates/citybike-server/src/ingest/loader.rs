//! Batched dataset loading
//!
//! [`load`] consumes a lazy sequence of text lines, verifies the header,
//! decodes each row through a [`RowCodec`], and submits accepted records to
//! a [`RecordSink`] in batches of [`MAX_BATCH_ROWS`].

use async_trait::async_trait;
use thiserror::Error;

use super::codec::{Decoded, RowCodec};
use super::models::MAX_BATCH_ROWS;

/// Destination for validated record batches.
///
/// Implemented by the transactional ingest session in production and by an
/// in-memory collector in tests. Each call submits one batch as a single
/// multi-row statement.
#[async_trait]
pub trait RecordSink<R>: Send {
    async fn submit(&mut self, batch: &[R]) -> Result<(), sqlx::Error>;
}

/// Counters for one dataset load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    /// Rows decoded and handed to the sink.
    pub accepted: u64,
    /// Rows silently skipped: wrong field count, parse failure, or
    /// semantic rejection.
    pub rejected: u64,
    /// Batches submitted to the sink.
    pub batches: u32,
}

/// Dataset-level load failures.
///
/// Individual bad rows never appear here; they are tallied in
/// [`LoadSummary::rejected`].
#[derive(Debug, Error)]
pub enum LoadError {
    /// The first line did not match the expected header constant. Nothing
    /// from this call has been submitted.
    #[error("header line does not match the expected dataset header")]
    HeaderMismatch,

    /// The sink failed; fatal to the enclosing upload.
    #[error("storage error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Normalize one raw line: drop a UTF-8 BOM and a trailing CR.
fn normalize(line: &str) -> &str {
    let line = line.strip_prefix('\u{feff}').unwrap_or(line);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Load one dataset from `lines` into `sink`.
///
/// The first line must equal the codec's header exactly, otherwise the
/// whole dataset is rejected and nothing is submitted. Every further line
/// is split on commas; lines with a deviating field count and rows the
/// codec rejects are skipped and tallied. Accepted records are submitted
/// in batches of [`MAX_BATCH_ROWS`]; the trailing partial batch is
/// submitted once at end of input, even when it holds a single record.
///
/// An empty line terminates the dataset.
pub async fn load<'a, C, S, I>(
    mut lines: I,
    codec: &C,
    sink: &mut S,
) -> Result<LoadSummary, LoadError>
where
    C: RowCodec,
    C::Record: Send + Sync,
    S: RecordSink<C::Record>,
    I: Iterator<Item = &'a str> + Send,
{
    match lines.next().map(normalize) {
        Some(header) if header == codec.header() => {},
        _ => return Err(LoadError::HeaderMismatch),
    }

    let field_count = codec.field_count();
    let mut summary = LoadSummary::default();
    let mut batch: Vec<C::Record> = Vec::with_capacity(MAX_BATCH_ROWS);

    for line in lines {
        let line = normalize(line);
        if line.is_empty() {
            break;
        }

        let fields: Vec<&str> = line.split(',').collect();
        if fields.len() != field_count {
            summary.rejected += 1;
            continue;
        }

        match codec.decode(&fields) {
            Decoded::Accepted(record) => {
                batch.push(record);
                summary.accepted += 1;

                if batch.len() == MAX_BATCH_ROWS {
                    sink.submit(&batch).await?;
                    summary.batches += 1;
                    batch.clear();
                }
            },
            Decoded::Rejected(reason) => {
                tracing::trace!(reason, "Row rejected");
                summary.rejected += 1;
            },
        }
    }

    if !batch.is_empty() {
        sink.submit(&batch).await?;
        summary.batches += 1;
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_bom_and_cr() {
        assert_eq!(normalize("\u{feff}Departure"), "Departure");
        assert_eq!(normalize("Departure\r"), "Departure");
        assert_eq!(normalize("Departure"), "Departure");
    }
}
