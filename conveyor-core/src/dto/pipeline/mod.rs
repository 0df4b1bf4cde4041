//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::project::ProjectId;

/// Request to create a new pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePipeline {
    pub project_id: ProjectId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub workflow: String,
    /// Absent means active; an explicit `false` is persisted as given
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

/// Request to update a pipeline
///
/// Empty or absent text fields leave the stored value unchanged.
/// `is_active` is not optional: every update states the desired activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdatePipeline {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub workflow: Option<String>,
    pub is_active: bool,
}

/// Query parameters for listing pipelines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListPipelines {
    pub project_id: Option<ProjectId>,
    /// Case-insensitive substring match on the pipeline name
    pub name: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
