//! Build DTOs

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::project::ProjectId;

/// Request to trigger a build of a pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TriggerBuild {
    #[serde(default)]
    pub commit_sha: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    /// Overrides the display name of the authenticated caller
    #[serde(default)]
    pub triggered_by: Option<String>,
    #[serde(default)]
    pub variables: Option<HashMap<String, String>>,
}

/// Query parameters for listing the builds of a pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListBuilds {
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Build job handed to the build queue
///
/// Not persisted by the orchestrator. Once the queue accepts it, the job
/// belongs to the queue and its executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildJob {
    pub build_id: Uuid,
    pub pipeline_id: Uuid,
    pub project_id: ProjectId,
    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    pub variables: HashMap<String, String>,
}
