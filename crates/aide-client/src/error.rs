//! Error types for aide-client

use thiserror::Error;

/// Result type alias using aide-client Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when talking to the generation backend
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend returned an error response
    #[error("Backend error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request exceeded the client timeout
    #[error("Request timed out")]
    Timeout,

    /// Unexpected response format
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl Error {
    /// Create a backend error from status and message
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error was caused by a timeout
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Timeout => true,
            Error::Http(e) => e.is_timeout(),
            _ => false,
        }
    }
}
