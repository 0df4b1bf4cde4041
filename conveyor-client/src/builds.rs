//! Build-related API endpoints

use conveyor_core::domain::build::{Build, BuildSnapshot};
use conveyor_core::dto::build::{ListBuilds, TriggerBuild};
use conveyor_core::dto::page::Page;
use reqwest::Method;
use uuid::Uuid;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    /// Trigger a build of a pipeline
    ///
    /// A `FAILED_PRECONDITION` error means the build was recorded but no
    /// build queue is configured; retrying would record another build.
    pub async fn trigger_build(&self, pipeline_id: Uuid, req: TriggerBuild) -> Result<Build> {
        let path = format!("/pipeline/{}/build", pipeline_id);
        let response = self.request(Method::POST, &path).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// List the builds of a pipeline, newest first
    pub async fn list_builds(&self, pipeline_id: Uuid, query: &ListBuilds) -> Result<Page<Build>> {
        let path = format!("/pipeline/{}/builds", pipeline_id);
        let response = self.request(Method::GET, &path).query(query).send().await?;

        self.handle_response(response).await
    }

    /// Get a build by ID
    pub async fn get_build(&self, build_id: Uuid) -> Result<Build> {
        let path = format!("/build/{}", build_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Get the workflow snapshot a build was triggered with
    pub async fn get_build_snapshot(&self, build_id: Uuid) -> Result<BuildSnapshot> {
        let path = format!("/build/{}/snapshot", build_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Pending builds recorded without a snapshot (super-admin only)
    pub async fn list_unsnapshotted_builds(&self) -> Result<Vec<Build>> {
        let response = self
            .request(Method::GET, "/build/unsnapshotted")
            .send()
            .await?;

        self.handle_response(response).await
    }
}
