//! Shared HTTP-to-port error mapping for the reqwest clients

use crate::ports::BackendError;
use reqwest::StatusCode;

/// Classify a non-success HTTP status
///
/// Throttling and server-side errors are retryable; anything else the
/// backend rejected deliberately and retrying would not help.
pub(crate) fn classify_status(status: StatusCode, body: &str) -> BackendError {
    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
        BackendError::Transient(format!("HTTP {}: {}", status, truncate(body)))
    } else {
        BackendError::Fatal(format!("HTTP {}: {}", status, truncate(body)))
    }
}

/// Classify a reqwest send/read failure for a mid-batch call
pub(crate) fn classify_send_error(e: reqwest::Error) -> BackendError {
    BackendError::Transient(format!("request failed: {}", e))
}

fn truncate(body: &str) -> &str {
    let end = body.char_indices().nth(200).map_or(body.len(), |(i, _)| i);
    &body[..end]
}
