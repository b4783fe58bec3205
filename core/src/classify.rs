//! Diagnostic logging for failed attempts.
//!
//! A 404 is an expected "not found" answer and is kept out of the logs.
//! Resets are warnings. Missing tokens are the caller's concern and not
//! logged at all. Everything else is an error.

use crate::error::ApiError;
use crate::http::HttpMethod;

/// Emit the log line for a failure that is about to be returned.
pub fn report(error: &ApiError, method: HttpMethod, url: &str) {
    match error {
        ApiError::NoToken => {}
        ApiError::Server { status: 404, .. } => {}
        ApiError::Server { status, message } => {
            tracing::error!(%method, url, status = *status, "Error {status}: {message}");
        }
        ApiError::TransportReset => {
            tracing::warn!(%method, url, "Connection reset, likely a network issue");
        }
        ApiError::MaxRetriesExceeded { attempts, last } => {
            tracing::error!(%method, url, attempts = *attempts, cause = %last, "{error}");
        }
        ApiError::Timeout
        | ApiError::Transport(_)
        | ApiError::InvalidRequest(_)
        | ApiError::Decode(_) => {
            tracing::error!(%method, url, "Request failed: {error}");
        }
    }
}
