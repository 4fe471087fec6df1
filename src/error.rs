//! Error types for nzb-stream
//!
//! This module provides the error taxonomy of the gateway, including:
//! - Pipeline errors (configuration, submission, polling, job failure, file location)
//! - Streaming errors raised while proxying bytes from the file share
//! - HTTP status code mapping for API integration
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use utoipa::ToSchema;

/// Result type alias for nzb-stream operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for nzb-stream
///
/// Only [`Error::JobFailed`] is a cacheable terminal outcome; every other variant is
/// treated as transient by the stream cache (see [`Error::is_cacheable`]).
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is missing or invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "manager.api_key")
        key: Option<String>,
    },

    /// The download manager rejected the job or gave an ambiguous answer
    #[error("submission rejected: {0}")]
    Submission(String),

    /// The job did not reach a terminal state before the polling deadline
    #[error("job {job_id} in category {category} did not finish within {}s", .waited.as_secs())]
    PollTimeout {
        /// Job id assigned by the download manager
        job_id: String,
        /// Category the job was queued under
        category: String,
        /// How long the poller waited
        waited: Duration,
    },

    /// The download manager reports the job as failed
    #[error("job {job_id} in category {category} failed: {reason}")]
    JobFailed {
        /// Job id assigned by the download manager
        job_id: String,
        /// Category the job was queued under
        category: String,
        /// Failure reason reported by the manager
        reason: String,
    },

    /// The completed job contains no playable video file
    #[error("no playable video file in {category}/{job_name}")]
    NoPlayableFile {
        /// Category the job completed under
        category: String,
        /// Output job name on the file share
        job_name: String,
    },

    /// Upstream failure while proxying bytes from the file share
    #[error("stream proxy error: {0}")]
    Proxy(String),

    /// The download manager API returned an error response
    #[error("download manager error: {0}")]
    Manager(String),

    /// File share operation failed (listing, bad multistatus, etc.)
    #[error("file share error: {0}")]
    Share(String),

    /// Inbound request is missing required data
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// API server error
    #[error("API server error: {0}")]
    ApiServerError(String),

    /// Anything else (e.g., a resolution task that panicked)
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Shorthand for a configuration error tied to a config key
    pub fn config(message: impl Into<String>, key: impl Into<String>) -> Self {
        Error::Config {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Whether this outcome is terminal and may be memoized by the stream cache
    ///
    /// Only a genuine job failure reported by the download manager qualifies. Everything
    /// else may succeed on a later attempt and must trigger a full retry.
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Error::JobFailed { .. })
    }

    /// Failure reason suitable for the `X-Stream-Failure-Reason` header
    pub fn failure_reason(&self) -> String {
        match self {
            Error::JobFailed { reason, .. } => reason.clone(),
            other => other.to_string(),
        }
    }
}

/// API error response format
///
/// This structure is returned by API endpoints when an error occurs.
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "poll_timeout",
///     "message": "job SABnzbd_nzo_x in category Movies did not finish within 80s",
///     "details": {
///       "job_id": "SABnzbd_nzo_x",
///       "category": "Movies"
///     }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "job_failed", "no_playable_file")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an "unauthorized" error
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new("unauthorized", message)
    }
}

/// Convert errors to HTTP status codes for API responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request
            Error::InvalidRequest(_) => 400,

            // 404 Not Found - the job finished but holds nothing to play
            Error::NoPlayableFile { .. } => 404,

            // 422 Unprocessable Entity - the job itself is broken
            Error::JobFailed { .. } => 422,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::ApiServerError(_) => 500,
            Error::Other(_) => 500,

            // 502 Bad Gateway - upstream collaborators misbehaved
            Error::Submission(_) => 502,
            Error::Manager(_) => 502,
            Error::Share(_) => 502,
            Error::Proxy(_) => 502,
            Error::Network(_) => 502,

            // 503 Service Unavailable - not configured for streaming
            Error::Config { .. } => 503,

            // 504 Gateway Timeout
            Error::PollTimeout { .. } => 504,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::Config { .. } => "config_error",
            Error::Submission(_) => "submission_error",
            Error::PollTimeout { .. } => "poll_timeout",
            Error::JobFailed { .. } => "job_failed",
            Error::NoPlayableFile { .. } => "no_playable_file",
            Error::Proxy(_) => "proxy_error",
            Error::Manager(_) => "manager_error",
            Error::Share(_) => "share_error",
            Error::InvalidRequest(_) => "invalid_request",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::ApiServerError(_) => "api_server_error",
            Error::Other(_) => "internal_error",
        }
    }
}

impl From<&Error> for ApiError {
    fn from(error: &Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match error {
            Error::Config { key: Some(key), .. } => Some(serde_json::json!({
                "key": key,
            })),
            Error::PollTimeout {
                job_id,
                category,
                waited,
            } => Some(serde_json::json!({
                "job_id": job_id,
                "category": category,
                "waited_secs": waited.as_secs(),
            })),
            Error::JobFailed {
                job_id,
                category,
                reason,
            } => Some(serde_json::json!({
                "job_id": job_id,
                "category": category,
                "reason": reason,
            })),
            Error::NoPlayableFile { category, job_name } => Some(serde_json::json!({
                "category": category,
                "job_name": job_name,
            })),
            _ => None,
        };

        ApiError {
            error: ErrorDetail {
                code,
                message,
                details,
            },
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        ApiError::from(&error)
    }
}
