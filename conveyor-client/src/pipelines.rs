//! Pipeline-related API endpoints

use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::dto::page::Page;
use conveyor_core::dto::pipeline::{CreatePipeline, ListPipelines, UpdatePipeline};
use reqwest::Method;
use uuid::Uuid;

use crate::OrchestratorClient;
use crate::error::Result;

impl OrchestratorClient {
    // =============================================================================
    // Pipeline Management
    // =============================================================================

    /// Create a new pipeline
    ///
    /// # Example
    /// ```no_run
    /// # use conveyor_client::OrchestratorClient;
    /// # use conveyor_core::dto::pipeline::CreatePipeline;
    /// # async fn example() -> anyhow::Result<()> {
    /// let client = OrchestratorClient::new("http://localhost:8080").with_identity(1, "olivia");
    /// let pipeline = client.create_pipeline(CreatePipeline {
    ///     project_id: 7,
    ///     name: "build-web".to_string(),
    ///     description: String::new(),
    ///     workflow: "steps: [build]".to_string(),
    ///     is_active: true,
    /// }).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_pipeline(&self, req: CreatePipeline) -> Result<Pipeline> {
        let response = self
            .request(Method::POST, "/pipeline/create")
            .json(&req)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// List pipelines matching `query`, one page at a time
    pub async fn list_pipelines(&self, query: &ListPipelines) -> Result<Page<Pipeline>> {
        let response = self
            .request(Method::GET, "/pipeline/list")
            .query(query)
            .send()
            .await?;

        self.handle_response(response).await
    }

    /// Get a pipeline by ID
    pub async fn get_pipeline(&self, pipeline_id: Uuid) -> Result<Pipeline> {
        let path = format!("/pipeline/{}", pipeline_id);
        let response = self.request(Method::GET, &path).send().await?;

        self.handle_response(response).await
    }

    /// Update a pipeline, returning the stored result
    pub async fn update_pipeline(&self, pipeline_id: Uuid, req: UpdatePipeline) -> Result<Pipeline> {
        let path = format!("/pipeline/{}", pipeline_id);
        let response = self.request(Method::PUT, &path).json(&req).send().await?;

        self.handle_response(response).await
    }

    /// Delete a pipeline
    pub async fn delete_pipeline(&self, pipeline_id: Uuid) -> Result<()> {
        let path = format!("/pipeline/{}", pipeline_id);
        let response = self.request(Method::DELETE, &path).send().await?;

        self.handle_empty_response(response).await
    }
}
