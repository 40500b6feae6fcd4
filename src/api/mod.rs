//! Client side of the widget chat API: streaming and one-shot requests

mod client;
mod decoder;
mod request;
mod response;
mod session;
mod sse;
mod streaming;
mod transport;

pub use client::ChatClient;
pub use decoder::{split_complete_lines, DecodeStats, Fragment, StreamDecoder};
pub use request::{AskRequest, ChatRequest};
pub use response::ChatResponse;
pub use session::{ReaderGuard, RequestSession};
pub use sse::{parse_frame, Frame, DATA_PREFIX};
pub use streaming::{AbortHandle, SendOptions, DEFAULT_DELAY_MS};
pub use transport::{ByteStream, ChatTransport, HttpTransport, TransportResponse};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The single error shape every failed request is reported with.
///
/// `status` is the HTTP status code, or `0` when no response was received
/// (connection failure, read failure, missing body, abort).
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("{status}: {message}")]
pub struct ApiError {
    pub status: u16,
    pub message: String,
}

impl ApiError {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// True when the failure happened before any HTTP status was received
    pub fn is_network(&self) -> bool {
        self.status == 0
    }
}

/// Failures raised inside a request, before they reach the caller.
///
/// Converted into [`ApiError`] at the client boundary.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Network error: {0}")]
    Transport(String),

    #[error("HTTP error! status: {status}")]
    Status { status: u16, body: String },

    #[error("Stream read error: {0}")]
    Read(String),

    #[error("Response body is null")]
    MissingBody,

    #[error("Request aborted")]
    Aborted,

    #[error("Invalid response payload: {0}")]
    Payload(#[from] serde_json::Error),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Status { status, body } => {
                let message = if body.trim().is_empty() {
                    "Server error".to_string()
                } else {
                    body
                };
                ApiError::new(status, message)
            }
            other => ApiError::new(0, other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_keeps_body() {
        let err: ApiError = SessionError::Status {
            status: 500,
            body: "oops".to_string(),
        }
        .into();
        assert_eq!(err.status, 500);
        assert!(err.message.contains("oops"));
        assert_eq!(err.to_string(), "500: oops");
    }

    #[test]
    fn test_status_error_empty_body_falls_back() {
        let err: ApiError = SessionError::Status {
            status: 502,
            body: "  ".to_string(),
        }
        .into();
        assert_eq!(err, ApiError::new(502, "Server error"));
    }

    #[test]
    fn test_transport_side_errors_have_status_zero() {
        for err in [
            SessionError::Transport("connection refused".to_string()),
            SessionError::Read("reset".to_string()),
            SessionError::MissingBody,
            SessionError::Aborted,
        ] {
            let api: ApiError = err.into();
            assert!(api.is_network(), "{:?}", api);
        }

        let api: ApiError = SessionError::Transport("connection refused".to_string()).into();
        assert_eq!(api.message, "Network error: connection refused");
    }
}
