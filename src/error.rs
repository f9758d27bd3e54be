//! Error types for newswire.

use thiserror::Error;

/// Failure while retrieving a feed over the network.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Connection, timeout or body read failure.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {status_text}")]
    HttpStatus {
        /// Numeric HTTP status code.
        status: u16,
        /// Canonical reason phrase for the status.
        status_text: String,
    },

    /// The feed URL is malformed or not http(s).
    #[error("invalid feed URL: {0}")]
    InvalidUrl(String),

    /// The body exceeds the configured size ceiling.
    #[error("feed too large: {size} bytes (max {max} bytes)")]
    TooLarge { size: u64, max: u64 },
}

/// Common error type for newswire.
#[derive(Error, Debug)]
pub enum NewswireError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error for input data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// JSON encoding or decoding error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Feed document could not be parsed.
    #[error("feed parse error: {0}")]
    Parse(String),

    /// Feed retrieval error.
    #[error(transparent)]
    Feed(#[from] FetchError),
}

impl From<sqlx::Error> for NewswireError {
    fn from(e: sqlx::Error) -> Self {
        NewswireError::Database(e.to_string())
    }
}

/// Result type alias for newswire operations.
pub type Result<T> = std::result::Result<T, NewswireError>;
