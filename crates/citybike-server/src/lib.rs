//! Citybike Server Library
//!
//! HTTP server for ingesting and browsing city bike journey data.
//!
//! # Overview
//!
//! The server exposes a small REST API over two PostgreSQL tables:
//!
//! - **Ingestion**: CSV uploads of journeys and stations are validated line
//!   by line, converted to typed records, and written in fixed-size batches
//!   inside one transaction per upload request
//! - **Journeys**: filtered, sorted, paginated listing with peek-ahead
//!   pagination and a whitelisted dynamic ORDER BY
//! - **Stations**: station list and a per-station statistics report
//!
//! # Architecture
//!
//! Feature slices under [`features`] own their request/response types,
//! validation, and route handlers. The ingestion machinery lives under
//! [`ingest`]: a pure row codec, a batching loader generic over a record
//! sink, and a pipeline that drives both datasets through one transaction.
//!
//! ## Framework Stack
//!
//! - **Axum**: web framework
//! - **SQLx**: PostgreSQL access (runtime query API)
//! - **Tower**: middleware and tracing
//!
//! # Example
//!
//! ```no_run
//! use citybike_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod db;
pub mod features;
pub mod ingest;

// Re-export commonly used types
pub use api::response::{ApiResult, AppError};
