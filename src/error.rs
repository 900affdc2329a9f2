//! OpenLens error types

use std::time::Duration;

/// OpenLens error types
#[derive(Debug, thiserror::Error)]
pub enum OpenLensError {
    // Transport errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    // API errors
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl OpenLensError {
    /// Whether a retry has a chance of succeeding.
    ///
    /// Transport failures, timeouts, rate limiting and server-side (5xx, 408)
    /// statuses are transient. Other client errors and undecodable bodies
    /// are deterministic and returned as-is.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Http(_) | Self::Timeout(_) | Self::RateLimited { .. } => true,
            Self::Api { status, .. } => *status == 408 || *status >= 500,
            Self::Json(_) | Self::InvalidInput(_) | Self::Configuration(_) => false,
        }
    }

    /// Server-provided cooldown, if this is a rate-limit error that carried one.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }

    /// Whether the API answered 404 for the requested resource.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Result type alias for OpenLens operations
pub type Result<T> = std::result::Result<T, OpenLensError>;
