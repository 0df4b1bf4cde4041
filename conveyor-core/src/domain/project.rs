//! Project directory types
//!
//! Projects and their members are owned by the external project directory.
//! Only the fields needed for authorization decisions are modelled here.

use serde::{Deserialize, Serialize};

/// Identifier of a project in the project directory
pub type ProjectId = i64;

/// Identifier of a user, as resolved by the identity gateway
pub type UserId = i64;

/// A project as seen by the authorization gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub owner_id: UserId,
}

/// Role of a member inside a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProjectRole {
    Owner,
    Admin,
    Member,
}

impl ProjectRole {
    /// Whether this role may mutate project resources
    pub fn can_manage(self) -> bool {
        matches!(self, ProjectRole::Owner | ProjectRole::Admin)
    }
}

/// A user's membership in a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub user_id: UserId,
    pub role: ProjectRole,
}
