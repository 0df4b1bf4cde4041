//! Repository Module
//!
//! Data access layer for the orchestrator.
//! Each repository handles persistence for a specific domain entity. The
//! services only see the traits, so tests can run against in-memory stores.

pub mod build;
#[cfg(test)]
pub mod memory;
pub mod pipeline;
pub mod schedule;

use async_trait::async_trait;
use conveyor_core::domain::build::{Build, BuildSnapshot};
use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::domain::project::ProjectId;
use conveyor_core::domain::schedule::PipelineSchedule;
use conveyor_core::dto::page::PageRequest;
use conveyor_core::dto::pipeline::CreatePipeline;
use uuid::Uuid;

// Re-export implementations
pub use build::PgBuildRepository;
pub use pipeline::PgPipelineRepository;
pub use schedule::PgScheduleRepository;

/// Repository error type
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// A unique constraint rejected the write
    #[error("unique constraint violated: {0}")]
    Conflict(String),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

impl From<sqlx::Error> for RepositoryError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            // PostgreSQL unique_violation
            if db_err.code().as_deref() == Some("23505") {
                let constraint = db_err.constraint().unwrap_or("unknown").to_string();
                return RepositoryError::Conflict(constraint);
            }
        }
        RepositoryError::Database(err)
    }
}

/// Filter for listing pipelines
#[derive(Debug, Clone, Default)]
pub struct PipelineFilter {
    pub project_id: Option<ProjectId>,
    /// Case-insensitive substring of the name
    pub name: Option<String>,
}

/// Persistence of pipeline definitions
#[async_trait]
pub trait PipelineRepository: Send + Sync {
    /// Insert a new pipeline, generating its id and timestamps
    async fn create(&self, req: &CreatePipeline) -> Result<Pipeline, RepositoryError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pipeline>, RepositoryError>;

    /// One page of matching pipelines, newest first, plus the total match count
    async fn list(
        &self,
        filter: &PipelineFilter,
        page: PageRequest,
    ) -> Result<(Vec<Pipeline>, u64), RepositoryError>;

    /// Overwrite every mutable field of an existing pipeline
    ///
    /// Returns false when no pipeline has that id.
    async fn update(&self, pipeline: &Pipeline) -> Result<bool, RepositoryError>;

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError>;
}

/// Failure while recording a triggered build
#[derive(Debug, thiserror::Error)]
pub enum RecordError {
    /// Nothing was written
    #[error("failed to write build: {0}")]
    Build(#[source] RepositoryError),

    /// The snapshot write failed; `build_committed` tells whether the build
    /// row survived without a snapshot
    #[error("failed to write snapshot of build {build_id}: {source}")]
    Snapshot {
        build_id: Uuid,
        build_committed: bool,
        #[source]
        source: RepositoryError,
    },
}

/// Persistence of builds and their workflow snapshots
#[async_trait]
pub trait BuildRepository: Send + Sync {
    /// Persist a triggered build and its snapshot, build first.
    ///
    /// Transactional stores write both or neither. Other stores may leave the
    /// build committed when the snapshot write fails and must say so through
    /// `build_committed` in [`RecordError::Snapshot`].
    async fn record(&self, build: &Build, snapshot: &BuildSnapshot) -> Result<(), RecordError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Build>, RepositoryError>;

    async fn find_snapshot(&self, build_id: Uuid) -> Result<Option<BuildSnapshot>, RepositoryError>;

    /// One page of a pipeline's builds, newest first, plus the total count
    async fn list_by_pipeline(
        &self,
        pipeline_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Build>, u64), RepositoryError>;

    /// Pending builds that have no snapshot, oldest first
    async fn list_unsnapshotted(&self, limit: i64) -> Result<Vec<Build>, RepositoryError>;
}

/// Persistence of pipeline schedules
///
/// Schedules are always addressed through their pipeline.
#[async_trait]
pub trait ScheduleRepository: Send + Sync {
    async fn create(&self, schedule: &PipelineSchedule) -> Result<(), RepositoryError>;

    async fn find(
        &self,
        pipeline_id: Uuid,
        schedule_id: Uuid,
    ) -> Result<Option<PipelineSchedule>, RepositoryError>;

    /// One page of a pipeline's schedules, newest first, plus the total count
    async fn list_by_pipeline(
        &self,
        pipeline_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<PipelineSchedule>, u64), RepositoryError>;

    /// Overwrite cron, timezone and enabled flag; false when nothing matched
    async fn update(&self, schedule: &PipelineSchedule) -> Result<bool, RepositoryError>;

    async fn delete(&self, pipeline_id: Uuid, schedule_id: Uuid) -> Result<bool, RepositoryError>;
}
