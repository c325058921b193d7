//! Error types for the Tick API client.
//!
//! # Design
//! Callers need to know whether response details are available, so the
//! response-bearing failure gets its own variant and carries the full
//! `HttpResponse`. Failures where nothing was received collapse into
//! `Generic`, whose message is fixed and does not echo the underlying cause;
//! the cause is only visible in the log event emitted before the error is
//! returned.

use crate::http::HttpResponse;

/// Message carried by every `ApiError::Generic`.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong";

/// Errors returned by `ApiClient` operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The API answered, but with an error-classified response.
    #[error("API responded with {} {}", .0.status, .0.reason)]
    Response(HttpResponse),

    /// No response was obtained (connection refused, DNS failure, timeout).
    #[error("{message}")]
    Generic { message: String },

    /// The request payload could not be serialized to JSON.
    #[error("failed to encode request payload: {0}")]
    Encode(#[source] serde_json::Error),

    /// A GET/POST response body was not valid JSON.
    #[error("failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),
}

impl ApiError {
    pub(crate) fn generic() -> Self {
        ApiError::Generic {
            message: GENERIC_FAILURE_MESSAGE.to_string(),
        }
    }

    /// The response that caused this error, if one was received.
    pub fn response(&self) -> Option<&HttpResponse> {
        match self {
            ApiError::Response(response) => Some(response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.response().map(|response| response.status)
    }
}
