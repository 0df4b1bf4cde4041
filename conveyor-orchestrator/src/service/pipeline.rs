//! Pipeline Service
//!
//! Business logic for pipeline management.

use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::dto::page::{Page, PageRequest};
use conveyor_core::dto::pipeline::{CreatePipeline, ListPipelines, UpdatePipeline};
use std::sync::Arc;
use uuid::Uuid;

use super::error::{Result, ServiceError};
use crate::auth::{AccessGate, Actor};
use crate::repository::{PipelineFilter, PipelineRepository, RepositoryError};

const MAX_NAME_LEN: usize = 255;

pub struct PipelineService {
    repo: Arc<dyn PipelineRepository>,
    gate: Arc<dyn AccessGate>,
}

impl PipelineService {
    pub fn new(repo: Arc<dyn PipelineRepository>, gate: Arc<dyn AccessGate>) -> Self {
        Self { repo, gate }
    }

    /// Create a new pipeline
    pub async fn create(&self, actor: &Actor, req: CreatePipeline) -> Result<Pipeline> {
        if req.project_id == 0 {
            return Err(ServiceError::InvalidArgument(
                "project_id is required".to_string(),
            ));
        }
        validate_name(&req.name)?;

        self.gate.ensure_owner_or_admin(actor, req.project_id).await?;

        let pipeline = self.repo.create(&req).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => duplicate_name(&req.name, req.project_id),
            e => ServiceError::internal("failed to create pipeline", e),
        })?;

        tracing::info!(
            pipeline_id = %pipeline.id,
            project_id = pipeline.project_id,
            "Pipeline created: {}",
            pipeline.name
        );

        Ok(pipeline)
    }

    /// Get a pipeline by ID
    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Pipeline> {
        let pipeline = self.load(id).await?;
        self.gate
            .ensure_member_or_higher(actor, pipeline.project_id)
            .await?;
        Ok(pipeline)
    }

    /// List pipelines, newest first
    ///
    /// Only super-admins may list across projects.
    pub async fn list(&self, actor: &Actor, req: ListPipelines) -> Result<Page<Pipeline>> {
        match req.project_id {
            Some(project_id) => {
                self.gate.ensure_member_or_higher(actor, project_id).await?;
            }
            None if actor.super_admin => {}
            None => {
                return Err(ServiceError::InvalidArgument(
                    "project_id is required".to_string(),
                ));
            }
        }

        let filter = PipelineFilter {
            project_id: req.project_id,
            name: req.name.filter(|n| !n.is_empty()),
        };
        let page = PageRequest::new(req.page, req.page_size);

        let (items, total) = self
            .repo
            .list(&filter, page)
            .await
            .map_err(|e| ServiceError::internal("failed to list pipelines", e))?;

        Ok(Page::new(items, page, total))
    }

    /// Update a pipeline
    ///
    /// Empty text fields keep their stored value; `is_active` always applies.
    pub async fn update(&self, actor: &Actor, id: Uuid, req: UpdatePipeline) -> Result<Pipeline> {
        let mut pipeline = self.load(id).await?;
        self.gate
            .ensure_owner_or_admin(actor, pipeline.project_id)
            .await?;

        if let Some(name) = req.name.filter(|n| !n.is_empty()) {
            validate_name(&name)?;
            pipeline.name = name;
        }
        if let Some(description) = req.description.filter(|d| !d.is_empty()) {
            pipeline.description = description;
        }
        if let Some(workflow) = req.workflow.filter(|w| !w.is_empty()) {
            pipeline.workflow = workflow;
        }
        pipeline.is_active = req.is_active;
        pipeline.updated_at = chrono::Utc::now();

        let updated = self.repo.update(&pipeline).await.map_err(|e| match e {
            RepositoryError::Conflict(_) => duplicate_name(&pipeline.name, pipeline.project_id),
            e => ServiceError::internal("failed to update pipeline", e),
        })?;

        // Deleted between the lookup and the write
        if !updated {
            return Err(ServiceError::not_found("pipeline", id));
        }

        tracing::info!(pipeline_id = %id, "Pipeline updated");

        Ok(pipeline)
    }

    /// Delete a pipeline
    ///
    /// Builds and snapshots of the pipeline are kept.
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        let pipeline = self.load(id).await?;
        self.gate
            .ensure_owner_or_admin(actor, pipeline.project_id)
            .await?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| ServiceError::internal("failed to delete pipeline", e))?;

        if !deleted {
            return Err(ServiceError::not_found("pipeline", id));
        }

        tracing::info!(pipeline_id = %id, "Pipeline deleted");

        Ok(())
    }

    async fn load(&self, id: Uuid) -> Result<Pipeline> {
        self.repo
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::internal("failed to get pipeline", e))?
            .ok_or_else(|| ServiceError::not_found("pipeline", id))
    }
}

// =============================================================================
// Validation
// =============================================================================

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ServiceError::InvalidArgument(
            "pipeline name cannot be empty".to_string(),
        ));
    }

    if name.chars().count() > MAX_NAME_LEN {
        return Err(ServiceError::InvalidArgument(format!(
            "pipeline name is too long (max {MAX_NAME_LEN} characters)"
        )));
    }

    Ok(())
}

fn duplicate_name(name: &str, project_id: i64) -> ServiceError {
    ServiceError::AlreadyExists(format!(
        "pipeline '{name}' already exists in project {project_id}"
    ))
}
