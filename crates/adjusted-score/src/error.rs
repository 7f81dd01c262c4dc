//! Error types for the adjusted-score pipeline.
//!
//! Uses `thiserror` for structured error handling with automatic `From` implementations.

use std::time::Duration;

/// Errors from the DBLP client layer.
#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    /// HTTP transport error (connection, DNS, TLS, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limited by DBLP (429 response)
    #[error("Rate limited, retry after {retry_after:?}")]
    RateLimited {
        /// Wait applied before the next attempt
        retry_after: Duration,
    },

    /// Response too large for DBLP to serve (413 response)
    #[error("Payload too large: {message}")]
    PayloadTooLarge {
        /// Response body or message
        message: String,
    },

    /// Server error (5xx response)
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code
        status: u16,
        /// Error message
        message: String,
    },

    /// Unexpected HTTP status
    #[error("Unexpected status {status}: {message}")]
    UnexpectedStatus {
        /// HTTP status code
        status: u16,
        /// Response body or message
        message: String,
    },

    /// JSON parsing error
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),

    /// Configured endpoint is not a valid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    /// Create a rate limited error with the wait that will be applied.
    #[must_use]
    pub const fn rate_limited(retry_after: Duration) -> Self {
        Self::RateLimited { retry_after }
    }

    /// Create a server error.
    #[must_use]
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        Self::Server { status, message: message.into() }
    }

    /// Create a payload-too-large error.
    #[must_use]
    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::PayloadTooLarge { message: message.into() }
    }

    /// Returns true if the call may be retried in-process after a wait.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Returns true if the lookup should be queued for a later retry pass
    /// instead of failing the run.
    #[must_use]
    pub const fn is_deferrable(&self) -> bool {
        matches!(self, Self::PayloadTooLarge { .. } | Self::Server { status: 500, .. })
    }

    /// HTTP status behind this error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::RateLimited { .. } => Some(429),
            Self::PayloadTooLarge { .. } => Some(413),
            Self::Server { status, .. } | Self::UnexpectedStatus { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            Self::Parse(_) | Self::InvalidUrl(_) => None,
        }
    }
}

/// Errors while accumulating scores into the result tree.
#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    /// The author has no record under the institution being scored.
    #[error("No record for author '{author}' in institution result")]
    UnknownAuthor {
        /// Author name used as the record key
        author: String,
    },
}

/// Errors that abort a pipeline run.
#[derive(thiserror::Error, Debug)]
pub enum PipelineError {
    /// Error from the DBLP client
    #[error("API error: {0}")]
    Client(#[from] ClientError),

    /// Error while mutating the result tree
    #[error("Scoring error: {0}")]
    Score(#[from] ScoreError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Roster could not be read
    #[error("Roster error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
