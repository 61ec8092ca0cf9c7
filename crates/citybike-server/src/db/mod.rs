//! Database pool construction

use crate::config::DatabaseConfig;
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use thiserror::Error;

/// Database operation errors with contextual information
#[derive(Error, Debug)]
pub enum DbError {
    /// SQL query or connection error
    #[error("Database query failed: {0}")]
    Sqlx(#[from] sqlx::Error),

    /// Database configuration is invalid or missing
    #[error("Database configuration error: {0}. Check DATABASE_URL and connection settings.")]
    Config(String),

    /// Requested record does not exist
    #[error("{0}")]
    NotFound(String),
}

impl DbError {
    /// Create a not found error with resource context
    pub fn not_found(resource_type: &str, identifier: &str) -> Self {
        Self::NotFound(format!(
            "{} '{}' not found in database",
            resource_type, identifier
        ))
    }
}

pub type DbResult<T> = Result<T, DbError>;

/// Create a connection pool from the database configuration
pub async fn create_pool(config: &DatabaseConfig) -> DbResult<PgPool> {
    if config.url.is_empty() {
        return Err(DbError::Config("DATABASE_URL not set".to_string()));
    }

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .connect(&config.url)
        .await?;

    tracing::info!(
        max_connections = config.max_connections,
        "Database connection pool established"
    );

    Ok(pool)
}
