//! Project directory
//!
//! The external service that owns projects and their member rosters. The
//! authorization gate asks it who owns a project and who belongs to it.

mod http;

use async_trait::async_trait;
use conveyor_core::domain::project::{Project, ProjectId, ProjectMember};

pub use http::HttpProjectDirectory;

/// Directory error type
///
/// A missing project and an unreachable directory stay distinct so the
/// gate never mistakes an outage for a denial.
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("project {0} not found")]
    ProjectNotFound(ProjectId),

    #[error("project directory unavailable: {0}")]
    Unavailable(String),
}

/// Read access to the project directory
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, DirectoryError>;

    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectMember>, DirectoryError>;
}
