//! Schedule-related API endpoints

use conveyor_core::domain::schedule::PipelineSchedule;
use conveyor_core::dto::page::Page;
use conveyor_core::dto::schedule::{CreateSchedule, ListSchedules, UpdateSchedule};
use reqwest::Method;
use uuid::Uuid;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    // =============================================================================
    // Pipeline Schedules
    // =============================================================================

    /// Attach a cron schedule to a pipeline
    pub async fn create_schedule(
        &self,
        pipeline_id: Uuid,
        req: CreateSchedule,
    ) -> Result<PipelineSchedule> {
        let path = format!("/pipeline/{}/schedules", pipeline_id);
        let response = self.request(Method::POST, &path).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// List the schedules of a pipeline, newest first
    pub async fn list_schedules(
        &self,
        pipeline_id: Uuid,
        query: &ListSchedules,
    ) -> Result<Page<PipelineSchedule>> {
        let path = format!("/pipeline/{}/schedules", pipeline_id);
        let response = self.request(Method::GET, &path).query(query).send().await?;

        self.handle_response(response).await
    }

    pub async fn update_schedule(
        &self,
        pipeline_id: Uuid,
        schedule_id: Uuid,
        req: UpdateSchedule,
    ) -> Result<PipelineSchedule> {
        let path = format!("/pipeline/{}/schedules/{}", pipeline_id, schedule_id);
        let response = self.request(Method::PUT, &path).json(&req).send().await?;

        self.handle_response(response).await
    }

    pub async fn delete_schedule(&self, pipeline_id: Uuid, schedule_id: Uuid) -> Result<()> {
        let path = format!("/pipeline/{}/schedules/{}", pipeline_id, schedule_id);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }
}
