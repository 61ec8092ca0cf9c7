//! CSV ingestion machinery
//!
//! The ingestion path is split into small, separately testable pieces:
//!
//! - [`codec`]: pure row decoding, one CSV line to one typed record
//! - [`loader`]: header verification plus batched accumulation into a
//!   record sink
//! - [`storage`]: the transactional session that owns the multi-row
//!   INSERT statements
//! - [`pipeline`]: drives both datasets of one upload through a single
//!   transaction and produces the per-dataset verdicts
//!
//! Row-level problems (wrong field count, unparseable fields, implausible
//! micro-trips) are absorbed locally and only tallied; a dataset is failed
//! outright only when its header line does not match the expected constant.
//! Storage errors abort the whole upload request.

pub mod codec;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod storage;

pub use loader::{LoadError, LoadSummary};
pub use pipeline::{ingest, IngestReport};
