// --- File: crates/rowkeeper_common/src/lib.rs ---

pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities

// Re-export error types and utilities for easier access
pub use error::{
    config_error, conflict, not_found, validation_error, ApiError, Context, HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{handle_json_result, json_list_response, IntoHttpResponse};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error, log_result, parse_level};
