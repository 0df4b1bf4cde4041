//! Schedule Service
//!
//! Cron schedules attached to pipelines. Access follows the pipeline's
//! project: managing schedules takes owner or admin, reading them takes
//! membership.

use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::domain::schedule::PipelineSchedule;
use conveyor_core::dto::page::{Page, PageRequest};
use conveyor_core::dto::schedule::{CreateSchedule, ListSchedules, UpdateSchedule};
use std::sync::Arc;
use uuid::Uuid;

use super::error::{Result, ServiceError};
use crate::auth::{AccessGate, Actor};
use crate::repository::{PipelineRepository, ScheduleRepository};

const MAX_CRON_LEN: usize = 128;
const MAX_TIMEZONE_LEN: usize = 64;

pub struct ScheduleService {
    pipelines: Arc<dyn PipelineRepository>,
    schedules: Arc<dyn ScheduleRepository>,
    gate: Arc<dyn AccessGate>,
}

impl ScheduleService {
    pub fn new(
        pipelines: Arc<dyn PipelineRepository>,
        schedules: Arc<dyn ScheduleRepository>,
        gate: Arc<dyn AccessGate>,
    ) -> Self {
        Self {
            pipelines,
            schedules,
            gate,
        }
    }

    /// Attach a schedule to a pipeline
    pub async fn create(
        &self,
        actor: &Actor,
        pipeline_id: Uuid,
        req: CreateSchedule,
    ) -> Result<PipelineSchedule> {
        let pipeline = self.load_pipeline(pipeline_id).await?;
        self.gate
            .ensure_owner_or_admin(actor, pipeline.project_id)
            .await?;

        validate_cron(&req.cron)?;
        if let Some(timezone) = &req.timezone {
            validate_timezone(timezone)?;
        }

        let schedule = PipelineSchedule::new(pipeline.id, req.cron, req.timezone, req.enabled);
        self.schedules
            .create(&schedule)
            .await
            .map_err(|e| ServiceError::internal("failed to create schedule", e))?;

        tracing::info!(
            schedule_id = %schedule.id,
            pipeline_id = %pipeline.id,
            cron = %schedule.cron,
            "Schedule created"
        );

        Ok(schedule)
    }

    /// List a pipeline's schedules, newest first
    pub async fn list(
        &self,
        actor: &Actor,
        pipeline_id: Uuid,
        req: ListSchedules,
    ) -> Result<Page<PipelineSchedule>> {
        let pipeline = self.load_pipeline(pipeline_id).await?;
        self.gate
            .ensure_member_or_higher(actor, pipeline.project_id)
            .await?;

        let page = PageRequest::new(req.page, req.page_size);
        let (items, total) = self
            .schedules
            .list_by_pipeline(pipeline.id, page)
            .await
            .map_err(|e| ServiceError::internal("failed to list schedules", e))?;

        Ok(Page::new(items, page, total))
    }

    /// Update a schedule
    ///
    /// Empty text fields keep their stored value; `enabled` always applies.
    pub async fn update(
        &self,
        actor: &Actor,
        pipeline_id: Uuid,
        schedule_id: Uuid,
        req: UpdateSchedule,
    ) -> Result<PipelineSchedule> {
        let pipeline = self.load_pipeline(pipeline_id).await?;
        self.gate
            .ensure_owner_or_admin(actor, pipeline.project_id)
            .await?;

        let mut schedule = self.load(pipeline.id, schedule_id).await?;

        if let Some(cron) = req.cron.filter(|c| !c.trim().is_empty()) {
            validate_cron(&cron)?;
            schedule.cron = cron;
        }
        if let Some(timezone) = req.timezone.filter(|tz| !tz.trim().is_empty()) {
            validate_timezone(&timezone)?;
            schedule.timezone = timezone;
        }
        schedule.enabled = req.enabled;
        schedule.updated_at = chrono::Utc::now();

        let updated = self
            .schedules
            .update(&schedule)
            .await
            .map_err(|e| ServiceError::internal("failed to update schedule", e))?;

        if !updated {
            return Err(ServiceError::not_found("schedule", schedule_id));
        }

        tracing::info!(schedule_id = %schedule_id, enabled = schedule.enabled, "Schedule updated");

        Ok(schedule)
    }

    /// Delete a schedule
    pub async fn delete(&self, actor: &Actor, pipeline_id: Uuid, schedule_id: Uuid) -> Result<()> {
        let pipeline = self.load_pipeline(pipeline_id).await?;
        self.gate
            .ensure_owner_or_admin(actor, pipeline.project_id)
            .await?;

        let deleted = self
            .schedules
            .delete(pipeline.id, schedule_id)
            .await
            .map_err(|e| ServiceError::internal("failed to delete schedule", e))?;

        if !deleted {
            return Err(ServiceError::not_found("schedule", schedule_id));
        }

        tracing::info!(schedule_id = %schedule_id, pipeline_id = %pipeline.id, "Schedule deleted");

        Ok(())
    }

    async fn load_pipeline(&self, id: Uuid) -> Result<Pipeline> {
        self.pipelines
            .find_by_id(id)
            .await
            .map_err(|e| ServiceError::internal("failed to get pipeline", e))?
            .ok_or_else(|| ServiceError::not_found("pipeline", id))
    }

    async fn load(&self, pipeline_id: Uuid, schedule_id: Uuid) -> Result<PipelineSchedule> {
        self.schedules
            .find(pipeline_id, schedule_id)
            .await
            .map_err(|e| ServiceError::internal("failed to get schedule", e))?
            .ok_or_else(|| ServiceError::not_found("schedule", schedule_id))
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Five fields, or six with leading seconds; the fields themselves are the
/// scheduler's to interpret
fn validate_cron(cron: &str) -> Result<()> {
    if cron.len() > MAX_CRON_LEN {
        return Err(ServiceError::InvalidArgument(format!(
            "cron expression is too long (max {MAX_CRON_LEN} characters)"
        )));
    }

    let fields = cron.split_whitespace().count();
    if !(5..=6).contains(&fields) {
        return Err(ServiceError::InvalidArgument(format!(
            "cron expression must have 5 or 6 fields, got {fields}"
        )));
    }

    Ok(())
}

fn validate_timezone(timezone: &str) -> Result<()> {
    if timezone.len() > MAX_TIMEZONE_LEN {
        return Err(ServiceError::InvalidArgument(format!(
            "timezone is too long (max {MAX_TIMEZONE_LEN} characters)"
        )));
    }
    Ok(())
}
