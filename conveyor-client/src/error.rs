//! Error types for the Conveyor client

use conveyor_core::dto::error::{ErrorBody, ErrorCode};
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Conveyor client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// API returned an error status code
    ///
    /// `code` is absent when the body was not an error body, e.g. a proxy
    /// answered instead of the orchestrator.
    #[error("API error (status {status}): {message}")]
    ApiError {
        status: u16,
        code: Option<ErrorCode>,
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from a status code and the raw response body
    pub fn api_error(status: u16, body: &str) -> Self {
        match serde_json::from_str::<ErrorBody>(body) {
            Ok(err) => Self::ApiError {
                status,
                code: Some(err.code),
                message: err.error,
            },
            Err(_) => Self::ApiError {
                status,
                code: None,
                message: body.to_string(),
            },
        }
    }

    /// Error category reported by the orchestrator, if any
    pub fn code(&self) -> Option<ErrorCode> {
        match self {
            Self::ApiError { code, .. } => *code,
            _ => None,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(ErrorCode::NotFound)
            || matches!(self, Self::ApiError { status: 404, .. })
    }

    pub fn is_permission_denied(&self) -> bool {
        self.code() == Some(ErrorCode::PermissionDenied)
    }

    /// Whether sending the same request again may succeed
    ///
    /// Transport failures and server-side faults are retryable. Rejected
    /// input, missing access, and a missing build queue are not.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::RequestFailed(e) => e.is_timeout() || e.is_connect(),
            Self::ApiError {
                code: Some(code), ..
            } => *code == ErrorCode::Internal,
            Self::ApiError { status, .. } => *status >= 500 || *status == 408,
            Self::ParseError(_) => false,
        }
    }
}
