//! Identity headers
//!
//! The API gateway authenticates callers and forwards their identity to the
//! orchestrator in these headers.

/// Numeric id of the caller (required)
pub const USER_ID_HEADER: &str = "x-user-id";

/// Display name of the caller, recorded as the trigger of a build
pub const USERNAME_HEADER: &str = "x-username";

/// Global role of the caller
pub const USER_ROLE_HEADER: &str = "x-user-role";

/// Role value the gateway sends for super-admins
pub const SUPER_ADMIN_ROLE: &str = "USER_ROLE_SUPER_ADMIN";
