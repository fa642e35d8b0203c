//! Error types for data sources.

use thiserror::Error;

/// Errors that can occur while fetching monitor records.
#[derive(Debug, Error)]
pub enum SourceError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Backend answered with a non-success status.
    #[error("Backend returned status {0}")]
    Status(u16),

    /// Failed to parse the response body or file contents.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Reading a local file failed.
    #[error("Read error: {0}")]
    Read(#[from] std::io::Error),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Connection(err.to_string())
        } else if err.is_decode() {
            SourceError::Parse(err.to_string())
        } else {
            SourceError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Parse(err.to_string())
    }
}
