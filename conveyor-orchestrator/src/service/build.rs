//! Build Service
//!
//! Triggers builds and serves their history. A trigger runs in a fixed
//! order: locate the pipeline, authorize, validate variables, record the
//! build together with its workflow snapshot, then hand a job to the queue.
//! Nothing is enqueued unless both records exist.

use conveyor_core::domain::build::{Build, BuildSnapshot};
use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::dto::build::{BuildJob, ListBuilds, TriggerBuild};
use conveyor_core::dto::page::{Page, PageRequest};
use std::sync::Arc;
use uuid::Uuid;

use super::error::{Result, ServiceError};
use super::variables::validate_variables;
use crate::auth::{AccessGate, Actor};
use crate::queue::BuildQueue;
use crate::repository::{BuildRepository, PipelineRepository, RecordError};

/// Most builds returned by one reconciliation audit
pub const UNSNAPSHOTTED_LIMIT: i64 = 100;

pub struct BuildService {
    pipelines: Arc<dyn PipelineRepository>,
    builds: Arc<dyn BuildRepository>,
    gate: Arc<dyn AccessGate>,
    queue: Option<Arc<dyn BuildQueue>>,
}

impl BuildService {
    /// `queue` is `None` when no executor is configured; triggers then fail
    /// after recording the build.
    pub fn new(
        pipelines: Arc<dyn PipelineRepository>,
        builds: Arc<dyn BuildRepository>,
        gate: Arc<dyn AccessGate>,
        queue: Option<Arc<dyn BuildQueue>>,
    ) -> Self {
        Self {
            pipelines,
            builds,
            gate,
            queue,
        }
    }

    /// Trigger a build of a pipeline
    pub async fn trigger(&self, actor: &Actor, pipeline_id: Uuid, req: TriggerBuild) -> Result<Build> {
        let pipeline = self.load_pipeline(pipeline_id).await?;

        self.gate
            .ensure_owner_or_admin(actor, pipeline.project_id)
            .await?;

        let variables = validate_variables(req.variables.as_ref())?;

        let triggered_by = match req.triggered_by.filter(|t| !t.is_empty()) {
            Some(name) => name,
            None => actor.display_name()?.to_string(),
        };

        let build = Build::pending(&pipeline, triggered_by, req.commit_sha, req.branch, variables);
        let snapshot = BuildSnapshot::capture(&build, &pipeline.workflow);

        self.builds
            .record(&build, &snapshot)
            .await
            .map_err(|e| match e {
                RecordError::Build(source) => {
                    ServiceError::internal("failed to create build", source)
                }
                RecordError::Snapshot {
                    build_id,
                    build_committed,
                    source,
                } => {
                    if build_committed {
                        tracing::error!(
                            build_id = %build_id,
                            error = %source,
                            "Build recorded without workflow snapshot"
                        );
                    }
                    ServiceError::internal("failed to create build snapshot", source)
                }
            })?;

        tracing::info!(
            build_id = %build.id,
            pipeline_id = %pipeline.id,
            workflow_sha256 = %snapshot.workflow_sha256,
            "Build recorded"
        );

        let Some(queue) = &self.queue else {
            tracing::warn!(build_id = %build.id, "Build queue not configured, build left pending");
            return Err(ServiceError::FailedPrecondition(
                "build queue not configured".to_string(),
            ));
        };

        let job = BuildJob {
            build_id: build.id,
            pipeline_id: pipeline.id,
            project_id: pipeline.project_id,
            commit_sha: build.commit_sha.clone(),
            branch: build.branch.clone(),
            variables: build.variables.clone(),
        };

        queue.enqueue(job).await.map_err(|e| {
            tracing::error!(build_id = %build.id, error = %e, "Failed to enqueue build");
            ServiceError::internal("failed to enqueue build", e)
        })?;

        tracing::info!(build_id = %build.id, "Build queued");

        Ok(build)
    }

    /// Get a build by ID
    pub async fn get_build(&self, actor: &Actor, id: Uuid) -> Result<Build> {
        let build = self
            .builds
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::internal("failed to get build", e))?
            .ok_or_else(|| ServiceError::not_found("build", id))?;

        self.authorize_read(actor, &build).await?;
        Ok(build)
    }

    /// Get the workflow snapshot taken when a build was triggered
    pub async fn get_snapshot(&self, actor: &Actor, build_id: Uuid) -> Result<BuildSnapshot> {
        let build = self.get_build(actor, build_id).await?;

        let snapshot = self
            .builds
            .find_snapshot(build.id)
            .await
            .map_err(|e| ServiceError::internal("failed to get build snapshot", e))?
            .ok_or_else(|| ServiceError::not_found("snapshot of build", build_id))?;

        // Served as stored; the digest mismatch is for operators to chase
        if !snapshot.is_intact() {
            tracing::warn!(
                build_id = %build.id,
                workflow_sha256 = %snapshot.workflow_sha256,
                "Snapshot workflow does not match its recorded digest"
            );
        }

        Ok(snapshot)
    }

    /// List the builds of a pipeline, newest first
    pub async fn list_builds(
        &self,
        actor: &Actor,
        pipeline_id: Uuid,
        req: ListBuilds,
    ) -> Result<Page<Build>> {
        let pipeline = self.load_pipeline(pipeline_id).await?;
        self.gate
            .ensure_member_or_higher(actor, pipeline.project_id)
            .await?;

        let page = PageRequest::new(req.page, req.page_size);
        let (items, total) = self
            .builds
            .list_by_pipeline(pipeline.id, page)
            .await
            .map_err(|e| ServiceError::internal("failed to list builds", e))?;

        Ok(Page::new(items, page, total))
    }

    /// Pending builds left without a snapshot, oldest first
    pub async fn unsnapshotted_builds(&self, actor: &Actor) -> Result<Vec<Build>> {
        if !actor.super_admin {
            return Err(ServiceError::PermissionDenied(
                "only super-admins can audit builds".to_string(),
            ));
        }

        self.builds
            .list_unsnapshotted(UNSNAPSHOTTED_LIMIT)
            .await
            .map_err(|e| ServiceError::internal("failed to list unsnapshotted builds", e))
    }

    async fn load_pipeline(&self, id: Uuid) -> Result<Pipeline> {
        self.pipelines
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::internal("failed to get pipeline", e))?
            .ok_or_else(|| ServiceError::not_found("pipeline", id))
    }

    // Builds outlive their pipeline; orphans are only visible to super-admins
    async fn authorize_read(&self, actor: &Actor, build: &Build) -> Result<()> {
        if actor.super_admin {
            return Ok(());
        }

        let pipeline = self
            .pipelines
            .find_by_id(build.pipeline_id)
            .await
            .map_err(|e| ServiceError::internal("failed to get pipeline", e))?;

        match pipeline {
            Some(pipeline) => {
                self.gate
                    .ensure_member_or_higher(actor, pipeline.project_id)
                    .await
            }
            None => Err(ServiceError::PermissionDenied(format!(
                "pipeline of build {} no longer exists",
                build.id
            ))),
        }
    }
}
