use async_trait::async_trait;
use conveyor_core::dto::build::BuildJob;

use super::{BuildQueue, QueueError};

/// Queue that POSTs each job to an executor endpoint
#[derive(Debug, Clone)]
pub struct HttpBuildQueue {
    client: reqwest::Client,
    url: String,
}

impl HttpBuildQueue {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl BuildQueue for HttpBuildQueue {
    async fn enqueue(&self, job: BuildJob) -> Result<(), QueueError> {
        let response = self.client.post(&self.url).json(&job).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(QueueError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        tracing::debug!(build_id = %job.build_id, "Build job posted to executor");
        Ok(())
    }
}
