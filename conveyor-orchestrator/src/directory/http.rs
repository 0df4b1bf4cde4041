//! HTTP client for the project directory service

use async_trait::async_trait;
use conveyor_core::domain::project::{Project, ProjectId, ProjectMember};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use super::{DirectoryError, ProjectDirectory};

/// HTTP implementation of [`ProjectDirectory`]
#[derive(Debug, Clone)]
pub struct HttpProjectDirectory {
    client: Client,
    base_url: String,
}

impl HttpProjectDirectory {
    /// Creates a new directory client
    ///
    /// # Arguments
    /// * `base_url` - Base URL of the directory (e.g., "http://projects:8080")
    /// * `client` - A configured reqwest Client
    pub fn new(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        project_id: ProjectId,
        url: String,
    ) -> Result<T, DirectoryError> {
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DirectoryError::Unavailable(format!("GET {url}: {e}")))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(DirectoryError::ProjectNotFound(project_id));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DirectoryError::Unavailable(format!(
                "GET {url}: {status} - {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| DirectoryError::Unavailable(format!("GET {url}: invalid body: {e}")))
    }
}

#[async_trait]
impl ProjectDirectory for HttpProjectDirectory {
    async fn get_project(&self, project_id: ProjectId) -> Result<Project, DirectoryError> {
        let url = format!("{}/api/v1/projects/{}", self.base_url, project_id);
        self.fetch(project_id, url).await
    }

    async fn list_members(
        &self,
        project_id: ProjectId,
    ) -> Result<Vec<ProjectMember>, DirectoryError> {
        let url = format!("{}/api/v1/projects/{}/members", self.base_url, project_id);
        self.fetch(project_id, url).await
    }
}
