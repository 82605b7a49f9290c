//! # Error Types
//!
//! Errors raised at the boundary of the library: parsing templates and data
//! contexts, reading files, running the HTTP server. The layout engine
//! itself never fails; bad template content degrades visibly instead.

use thiserror::Error;

/// Main error type for deepprint operations
#[derive(Debug, Error)]
pub enum DeepPrintError {
    /// Template JSON could not be parsed into the element model
    #[error("Invalid template: {0}")]
    Template(String),

    /// Data context is not a JSON object
    #[error("Invalid data context: {0}")]
    Data(String),

    /// Invalid command-line or server option
    #[error("Invalid option: {0}")]
    Config(String),

    /// HTTP server errors (bind, serve)
    #[error("Server error: {0}")]
    Server(String),

    /// JSON serialization error wrapper
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
