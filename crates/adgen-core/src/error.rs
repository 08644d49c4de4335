//! Error types for AdGen

use thiserror::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the campaign generator
#[derive(Error, Debug)]
pub enum Error {
    /// Required intake fields are missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The research call failed or returned unusable data
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// The image or video creative could not be produced
    #[error("Generation error: {0}")]
    Generation(String),

    /// A long-running remote job did not finish within the poll budget
    #[error("Remote job stalled: {0}")]
    Stall(String),

    /// Another research or creative action is already in flight
    #[error("Busy: {0}")]
    Busy(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Other error: {0}")]
    Other(String),
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Other(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
