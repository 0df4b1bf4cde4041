//! Build domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::digest::workflow_sha256;
use crate::domain::pipeline::Pipeline;

/// One triggered execution of a pipeline
///
/// Written once, in `Pending` state, when the build is triggered. Every later
/// status transition belongs to the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Build {
    pub id: Uuid,
    pub pipeline_id: Uuid,
    /// Pipeline name at trigger time
    pub name: String,
    pub status: BuildStatus,
    pub triggered_by: String,
    pub commit_sha: Option<String>,
    pub branch: Option<String>,
    #[serde(default)]
    pub variables: HashMap<String, String>,
    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl Build {
    /// Create a new pending build of `pipeline`.
    ///
    /// Empty commit and branch strings are stored as absent.
    pub fn pending(
        pipeline: &Pipeline,
        triggered_by: String,
        commit_sha: Option<String>,
        branch: Option<String>,
        variables: HashMap<String, String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            pipeline_id: pipeline.id,
            name: pipeline.name.clone(),
            status: BuildStatus::Pending,
            triggered_by,
            commit_sha: commit_sha.filter(|s| !s.is_empty()),
            branch: branch.filter(|s| !s.is_empty()),
            variables,
            created_at: Utc::now(),
            started_at: None,
            finished_at: None,
        }
    }
}

/// Build execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
    Cancelled,
}

impl BuildStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildStatus::Pending => "PENDING",
            BuildStatus::Running => "RUNNING",
            BuildStatus::Succeeded => "SUCCEEDED",
            BuildStatus::Failed => "FAILED",
            BuildStatus::Cancelled => "CANCELLED",
        }
    }
}

impl std::fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for BuildStatus {
    type Err = UnknownBuildStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(BuildStatus::Pending),
            "RUNNING" => Ok(BuildStatus::Running),
            "SUCCEEDED" => Ok(BuildStatus::Succeeded),
            "FAILED" => Ok(BuildStatus::Failed),
            "CANCELLED" => Ok(BuildStatus::Cancelled),
            other => Err(UnknownBuildStatus(other.to_string())),
        }
    }
}

/// A status string that does not name any [`BuildStatus`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownBuildStatus(pub String);

impl std::fmt::Display for UnknownBuildStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown build status: {}", self.0)
    }
}

impl std::error::Error for UnknownBuildStatus {}

/// Immutable copy of the workflow a build was triggered with
///
/// Exactly one snapshot exists per build. It keeps a full copy of the text,
/// not a reference to the pipeline, together with its SHA-256 digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSnapshot {
    pub id: Uuid,
    pub build_id: Uuid,
    pub pipeline_id: Uuid,
    pub name: String,
    pub workflow: String,
    pub workflow_sha256: String,
    pub created_at: DateTime<Utc>,
}

impl BuildSnapshot {
    /// Capture `workflow` as the definition `build` runs with.
    pub fn capture(build: &Build, workflow: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            build_id: build.id,
            pipeline_id: build.pipeline_id,
            name: build.name.clone(),
            workflow: workflow.to_string(),
            workflow_sha256: workflow_sha256(workflow),
            created_at: build.created_at,
        }
    }

    /// Whether the stored digest still matches the stored text
    pub fn is_intact(&self) -> bool {
        self.workflow_sha256 == workflow_sha256(&self.workflow)
    }
}
