//! Service errors
//!
//! One variant per failure category. Every collaborator failure is wrapped
//! into one of these with context; none is ever downgraded to success.

use conveyor_core::dto::error::ErrorCode;

/// Service error type
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("failed precondition: {0}")]
    FailedPrecondition(String),

    /// `context` is safe to show to callers, `detail` is only logged
    #[error("{context}: {detail}")]
    Internal { context: String, detail: String },
}

impl ServiceError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn internal(context: impl Into<String>, err: impl std::fmt::Display) -> Self {
        ServiceError::Internal {
            context: context.into(),
            detail: err.to_string(),
        }
    }

    /// Stable category of this error
    pub fn code(&self) -> ErrorCode {
        match self {
            ServiceError::Unauthenticated(_) => ErrorCode::Unauthenticated,
            ServiceError::PermissionDenied(_) => ErrorCode::PermissionDenied,
            ServiceError::NotFound { .. } => ErrorCode::NotFound,
            ServiceError::AlreadyExists(_) => ErrorCode::AlreadyExists,
            ServiceError::InvalidArgument(_) => ErrorCode::InvalidArgument,
            ServiceError::FailedPrecondition(_) => ErrorCode::FailedPrecondition,
            ServiceError::Internal { .. } => ErrorCode::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, ServiceError>;
