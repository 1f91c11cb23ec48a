//! Common error types for CareLedger.

use thiserror::Error;

/// Top-level error type for CareLedger operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Connectivity or timeout failure talking to the server.
    #[error("Network error: {0}")]
    Network(String),

    /// The server rejected the current credentials or session.
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// The server returned an unexpected or invalid response.
    #[error("Server error: {0}")]
    Server(String),

    /// Local storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias using the common Error.
pub type Result<T> = std::result::Result<T, Error>;
