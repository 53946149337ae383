//! Error types for the database client and entity providers

use rowkeeper_common::{config_error, conflict, not_found, validation_error, ApiError};
use thiserror::Error;

/// Errors that can occur when working with the database client
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from SQLx
    #[error("Database error: {0}")]
    SqlxError(#[from] sqlx::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// Error with database pool creation
    #[error("Database pool error: {0}")]
    PoolError(String),

    /// Error with database query
    #[error("Database query error: {0}")]
    QueryError(String),

    /// Error with database transaction
    #[error("Database transaction error: {0}")]
    TransactionError(String),

    /// A filter or key referenced a column the entity does not declare
    #[error("Unknown field '{field}' for table '{table}'")]
    UnknownField { table: &'static str, field: String },

    /// A single-row lookup matched nothing
    #[error("No result: {0}")]
    NoResult(String),

    /// A single-row lookup matched more than one row
    #[error("Expected one row from '{table}', found {count}")]
    NonUniqueResult { table: &'static str, count: usize },

    /// Entity could not be turned into column values
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Other errors
    #[error("Other database error: {0}")]
    Other(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NoResult(_) => not_found(err),
            DbError::NonUniqueResult { .. } => conflict(err),
            DbError::UnknownField { .. } => validation_error(err),
            DbError::SerializationError(_) => ApiError::ParseError(err.to_string()),
            DbError::ConfigError(_) | DbError::UrlError(_) => config_error(err),
            _ => ApiError::DatabaseError(err.to_string()),
        }
    }
}
