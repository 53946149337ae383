use std::fmt;
use thiserror::Error;

/// The error type returned by Rowkeeper HTTP handlers.
///
/// Each crate can extend this by implementing From<SpecificError> for ApiError.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Error occurred while parsing request data
    #[error("Failed to parse data: {0}")]
    ParseError(String),

    /// Error occurred due to missing or invalid configuration
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Error occurred during validation
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Error occurred during database operation
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Error occurred due to a conflict (e.g., more than one matching row)
    #[error("Conflict: {0}")]
    ConflictError(String),

    /// Error occurred due to a resource not being found
    #[error("Not found: {0}")]
    NotFoundError(String),

    /// Error occurred due to an internal error
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ApiError {
    fn status_code(&self) -> u16 {
        match self {
            ApiError::ParseError(_) => 400,
            ApiError::ConfigError(_) => 500,
            ApiError::ValidationError(_) => 400,
            ApiError::DatabaseError(_) => 500,
            ApiError::ConflictError(_) => 409,
            ApiError::NotFoundError(_) => 404,
            ApiError::InternalError(_) => 500,
        }
    }
}

/// A trait for adding context to errors.
pub trait Context<T, E> {
    /// Adds context to an error.
    fn context<C>(self, context: C) -> Result<T, ApiError>
    where
        C: fmt::Display + Send + Sync + 'static;

    /// Adds context to an error with a lazy context provider.
    fn with_context<C, F>(self, f: F) -> Result<T, ApiError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E: std::error::Error + Send + Sync + 'static> Context<T, E> for Result<T, E> {
    fn context<C>(self, context: C) -> Result<T, ApiError>
    where
        C: fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|error| ApiError::InternalError(format!("{}: {}", context, error)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T, ApiError>
    where
        C: fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|error| ApiError::InternalError(format!("{}: {}", f(), error)))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for ApiError {
    fn from(err: std::io::Error) -> Self {
        ApiError::InternalError(err.to_string())
    }
}

// Utility functions for error handling
pub fn config_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::ConfigError(message.to_string())
}

pub fn validation_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::ValidationError(message.to_string())
}

pub fn not_found<T: fmt::Display>(message: T) -> ApiError {
    ApiError::NotFoundError(message.to_string())
}

pub fn conflict<T: fmt::Display>(message: T) -> ApiError {
    ApiError::ConflictError(message.to_string())
}
