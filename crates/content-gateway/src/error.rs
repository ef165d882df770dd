//! Gateway error types.

use thiserror::Error;

/// Error type for remote gateway operations.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Gateway endpoint or key missing from configuration
    #[error("Content gateway is not configured")]
    NotConfigured,

    /// Operation requires a session and none is present
    #[error("Not signed in")]
    NotSignedIn,

    /// HTTP transport error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote rejected the request
    #[error("{context}: {status} ({body_summary})")]
    Rejected {
        context: &'static str,
        status: reqwest::StatusCode,
        body_summary: String,
    },

    /// Query matched no rows
    #[error("Row not found")]
    NotFound,

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Response violated the gateway contract
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl GatewayError {
    /// Returns true if this error is transient and the operation can be retried.
    ///
    /// Transient errors are connection failures, timeouts, and 5xx
    /// responses.
    pub fn is_transient(&self) -> bool {
        match self {
            GatewayError::Http(e) => {
                if e.is_connect() || e.is_timeout() {
                    return true;
                }
                if let Some(status) = e.status() {
                    return status.is_server_error();
                }
                false
            }
            GatewayError::Rejected { status, .. } => status.is_server_error(),
            _ => false,
        }
    }
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
