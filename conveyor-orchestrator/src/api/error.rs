//! API Error Handling
//!
//! Unified error type and conversion for API responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use conveyor_core::dto::error::ErrorBody;

use crate::service::ServiceError;

/// API error type
///
/// Wraps a [`ServiceError`] and renders it as an [`ErrorBody`].
#[derive(Debug)]
pub struct ApiError(pub ServiceError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let code = self.0.code();
        let status =
            StatusCode::from_u16(code.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match self.0 {
            ServiceError::Internal { context, detail } => {
                tracing::error!("Internal error: {}: {}", context, detail);
                context
            }
            other => other.to_string(),
        };

        (status, Json(ErrorBody { error: message, code })).into_response()
    }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        ApiError(err)
    }
}

// Extractor rejections are malformed input, rendered like any other error

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!("Rejected request body: {}", rejection);
        ApiError(ServiceError::InvalidArgument(rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(ServiceError::InvalidArgument(rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ServiceError::InvalidArgument(rejection.body_text()))
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
