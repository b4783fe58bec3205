//! Error taxonomy for the Eco Market API client.
//!
//! # Design
//! Every failure a call can end in maps to exactly one `ApiError` variant, and
//! the variant's `Display` text is the message the envelope carries back to
//! the UI. `TransportError` is the narrower vocabulary a `Transport` speaks;
//! it is folded into `ApiError` before classification.

use thiserror::Error;

pub const NO_TOKEN_MESSAGE: &str = "No token provided";
pub const CONNECTION_RESET_MESSAGE: &str = "Connection reset, please try again";
pub const MAX_RETRIES_MESSAGE: &str = "Max retries reached";
pub const REQUEST_FAILED_MESSAGE: &str = "Request failed";

/// Errors produced while building, executing or parsing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The caller supplied an empty bearer token. No request was sent.
    #[error("No token provided")]
    NoToken,

    /// The connection was reset by the peer mid-exchange.
    #[error("Connection reset, please try again")]
    TransportReset,

    /// The attempt exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// No response arrived: DNS failure, refused connection, protocol error.
    #[error("{}", or_request_failed(.0))]
    Transport(String),

    /// The request could not be built: empty URL, unserializable body.
    /// Nothing was sent.
    #[error("{}", or_request_failed(.0))]
    InvalidRequest(String),

    /// The server answered but its body could not be decoded.
    #[error("{}", or_request_failed(.0))]
    Decode(String),

    /// A read used up its attempt budget on transport failures.
    #[error("Max retries reached")]
    MaxRetriesExceeded { attempts: u32, last: Box<ApiError> },
}

fn or_request_failed(detail: &str) -> &str {
    if detail.trim().is_empty() {
        REQUEST_FAILED_MESSAGE
    } else {
        detail
    }
}

impl ApiError {
    /// Build a `Server` error, taking the message from a JSON body when it has
    /// a top-level string `message` and synthesizing one otherwise.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|value| match value.get("message") {
                Some(serde_json::Value::String(text)) if !text.is_empty() => Some(text.clone()),
                _ => None,
            })
            .unwrap_or_else(|| format!("Server error: {status}"));
        ApiError::Server { status, message }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn decode(detail: impl std::fmt::Display) -> Self {
        ApiError::Decode(format!("Invalid response body: {detail}"))
    }

    /// True when the failure happened below HTTP, with no server answer.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            ApiError::TransportReset | ApiError::Timeout | ApiError::Transport(_)
        )
    }

    /// True when repeating the same request might succeed: transport
    /// failures (DNS hiccups and refused connections included) and 5xx.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Server { status, .. } => *status >= 500,
            other => other.is_transport(),
        }
    }
}

/// Failures a `Transport` can report. Non-2xx statuses are not errors at
/// this level; they come back as ordinary `HttpResponse` values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("connection reset")]
    ConnectionReset,

    #[error("timed out")]
    Timeout,

    #[error("{0}")]
    Failed(String),

    /// The request was refused before going out, e.g. a malformed URI.
    #[error("{0}")]
    InvalidRequest(String),

    /// A response arrived but its body was unreadable as text.
    #[error("{0}")]
    InvalidBody(String),
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::ConnectionReset => ApiError::TransportReset,
            TransportError::Timeout => ApiError::Timeout,
            TransportError::Failed(detail) => ApiError::Transport(detail),
            TransportError::InvalidRequest(detail) => ApiError::InvalidRequest(detail),
            TransportError::InvalidBody(detail) => ApiError::decode(detail),
        }
    }
}

/// Invalid or missing configuration values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}
