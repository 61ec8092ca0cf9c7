//! Citybike Common Library
//!
//! Shared error handling and logging plumbing for the citybike workspace.
//!
//! # Overview
//!
//! This crate provides the functionality used across all citybike workspace
//! members:
//!
//! - **Error Handling**: the workspace-wide error type and result alias
//! - **Logging**: tracing subscriber configuration and initialization
//!
//! # Example
//!
//! ```no_run
//! use citybike_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> citybike_common::Result<()> {
//!     let config = LogConfig::from_env()?;
//!     init_logging(&config)?;
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod logging;

// Re-export commonly used types
pub use error::{CitybikeError, Result};
