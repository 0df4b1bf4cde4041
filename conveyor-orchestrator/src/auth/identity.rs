//! Caller identity
//!
//! The API gateway authenticates callers and forwards who they are in
//! request headers. A request without a user id is unauthenticated; there is
//! no anonymous identity.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use conveyor_core::domain::project::UserId;

use crate::api::error::ApiError;
use crate::service::error::ServiceError;

pub use conveyor_core::dto::identity::{USER_ID_HEADER, USER_ROLE_HEADER, USERNAME_HEADER};
use conveyor_core::dto::identity::SUPER_ADMIN_ROLE;

/// The authenticated caller of a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: UserId,
    /// Display name, when the gateway forwarded one
    pub username: Option<String>,
    /// Super-administrators bypass every project check
    pub super_admin: bool,
}

impl Actor {
    pub fn new(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: Some(username.into()),
            super_admin: false,
        }
    }

    pub fn super_admin(user_id: UserId, username: impl Into<String>) -> Self {
        Self {
            super_admin: true,
            ..Self::new(user_id, username)
        }
    }

    /// Resolve the caller from gateway headers
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, ServiceError> {
        let raw_id = headers
            .get(USER_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ServiceError::Unauthenticated(format!("missing {USER_ID_HEADER} header"))
            })?;

        let user_id = raw_id.parse::<UserId>().map_err(|e| {
            ServiceError::InvalidArgument(format!("invalid {USER_ID_HEADER}: {e}"))
        })?;

        let username = headers
            .get(USERNAME_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        // Duplicated role headers are allowed; any super-admin value wins
        let super_admin = headers
            .get_all(USER_ROLE_HEADER)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .any(is_super_admin_role);

        Ok(Self {
            user_id,
            username,
            super_admin,
        })
    }

    /// Display name of the caller, required wherever a name gets recorded
    pub fn display_name(&self) -> Result<&str, ServiceError> {
        self.username.as_deref().ok_or_else(|| {
            ServiceError::Unauthenticated(format!("missing {USERNAME_HEADER} header"))
        })
    }
}

fn is_super_admin_role(role: &str) -> bool {
    let role = role.trim();
    role == SUPER_ADMIN_ROLE || role.eq_ignore_ascii_case("SUPER_ADMIN")
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Actor::from_headers(&parts.headers)?)
    }
}
