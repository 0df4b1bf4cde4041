use async_trait::async_trait;
use conveyor_core::dto::build::BuildJob;
use sqlx::PgPool;
use sqlx::types::Json;

use super::{BuildQueue, QueueError};

/// Queue backed by the `build_queue` table, polled by executors
#[derive(Debug, Clone)]
pub struct PgBuildQueue {
    pool: PgPool,
}

impl PgBuildQueue {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildQueue for PgBuildQueue {
    async fn enqueue(&self, job: BuildJob) -> Result<(), QueueError> {
        sqlx::query(
            r#"
            INSERT INTO build_queue (build_id, pipeline_id, project_id, payload, enqueued_at)
            VALUES ($1, $2, $3, $4, NOW())
            "#,
        )
        .bind(job.build_id)
        .bind(job.pipeline_id)
        .bind(job.project_id)
        .bind(Json(&job))
        .execute(&self.pool)
        .await?;

        tracing::debug!(build_id = %job.build_id, "Build job queued");
        Ok(())
    }
}
