//! Pipeline domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::project::ProjectId;

/// Pipeline definition
///
/// A named workflow definition scoped to one project. The name is unique
/// within its project. Builds copy the workflow text when they are
/// triggered, so editing a pipeline never changes the history of past builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: Uuid,
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Workflow definition text handed to the executor
    #[serde(default)]
    pub workflow: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
