//! Error types for gitforge-tools.

use thiserror::Error;

/// Main error type for gitforge operations.
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed before a response was received
    #[error("HTTP error: {0}")]
    Http(String),

    /// Forge API returned a failure status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// A tool call carried missing or malformed arguments
    #[error("{0}")]
    InvalidArguments(String),

    /// No registered tool matches the requested name
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// Serialization/deserialization failed
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Build an [`Error::InvalidArguments`] naming a required parameter.
    pub fn required(name: &str) -> Self {
        Error::InvalidArguments(format!("{name} is required"))
    }
}

/// Result type alias for gitforge operations.
pub type Result<T> = std::result::Result<T, Error>;
