//! Error types shared across the citybike workspace

use thiserror::Error;

/// Result type alias for citybike operations
pub type Result<T> = std::result::Result<T, CitybikeError>;

/// Main error type for citybike
#[derive(Error, Debug)]
pub enum CitybikeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),
}
