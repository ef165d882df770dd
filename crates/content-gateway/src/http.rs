//! Shared HTTP response handling.

use crate::{GatewayError, GatewayResult};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Summarize a response body for logs without leaking its contents.
pub(crate) fn summarize_response_body(body: &str) -> String {
    let mut hasher = DefaultHasher::new();
    body.hash(&mut hasher);
    format!("len={},digest={:016x}", body.len(), hasher.finish())
}

/// Pass a successful response through, converting any other status into
/// [`GatewayError::Rejected`] with a body digest for the logs.
pub(crate) async fn expect_success(
    response: reqwest::Response,
    context: &'static str,
) -> GatewayResult<reqwest::Response> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    let body_summary = summarize_response_body(&body);
    tracing::error!(status = %status, body_summary = %body_summary, "{}", context);
    Err(GatewayError::Rejected {
        context,
        status,
        body_summary,
    })
}
