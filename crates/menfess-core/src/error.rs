//! Error types for the core library.

use thiserror::Error;

use crate::service::SearchError;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Search service failed.
    #[error("Search error: {0}")]
    Search(#[from] SearchError),

    /// Token handling failed.
    #[error("OAuth error: {0}")]
    OAuth(#[from] menfess_oauth::Error),

    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
