//! Centralized error types for Plastiscan.

use thiserror::Error;

/// Main error type for Plastiscan operations.
#[derive(Error, Debug)]
pub enum PlastiscanError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Vision model error (HTTP {status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Vision model returned no text content")]
    EmptyResponse,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid scan transition: cannot go from '{from}' to '{to}'")]
    Session { from: String, to: String },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Plastiscan operations.
pub type PlastiscanResult<T> = Result<T, PlastiscanError>;

impl PlastiscanError {
    /// Create an invalid image error.
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
