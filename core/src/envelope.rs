//! The uniform result every executor call returns.

use serde::Serialize;

use crate::error::{ApiError, REQUEST_FAILED_MESSAGE};

/// Normalized outcome of one API call.
///
/// `success == false` implies `payload` is `None` and `message` is a
/// non-empty string; the constructors are the only way to build one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    payload: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(payload: T, message: Option<String>) -> Self {
        Self {
            success: true,
            payload: Some(payload),
            message: message.filter(|m| !m.is_empty()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            success: false,
            payload: None,
            message: Some(if message.trim().is_empty() {
                REQUEST_FAILED_MESSAGE.to_string()
            } else {
                message
            }),
        }
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn payload(&self) -> Option<&T> {
        self.payload.as_ref()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResponse<U> {
        ApiResponse {
            success: self.success,
            payload: self.payload.map(f),
            message: self.message,
        }
    }

    /// `Ok(payload)` on success, `Err(message)` otherwise.
    pub fn into_result(self) -> Result<T, String> {
        match (self.success, self.payload) {
            (true, Some(payload)) => Ok(payload),
            _ => Err(self
                .message
                .unwrap_or_else(|| REQUEST_FAILED_MESSAGE.to_string())),
        }
    }
}

impl<T> From<ApiError> for ApiResponse<T> {
    fn from(err: ApiError) -> Self {
        ApiResponse::failure(err.to_string())
    }
}
