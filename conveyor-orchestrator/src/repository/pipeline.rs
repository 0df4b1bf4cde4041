//! Pipeline Repository
//!
//! Handles all database operations related to pipelines.

use async_trait::async_trait;
use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::dto::page::PageRequest;
use conveyor_core::dto::pipeline::CreatePipeline;
use sqlx::PgPool;
use uuid::Uuid;

use super::{PipelineFilter, PipelineRepository, RepositoryError};

/// Postgres implementation of [`PipelineRepository`]
#[derive(Debug, Clone)]
pub struct PgPipelineRepository {
    pool: PgPool,
}

impl PgPipelineRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PipelineRepository for PgPipelineRepository {
    async fn create(&self, req: &CreatePipeline) -> Result<Pipeline, RepositoryError> {
        let now = chrono::Utc::now();

        let pipeline = Pipeline {
            id: Uuid::new_v4(),
            project_id: req.project_id,
            name: req.name.clone(),
            description: req.description.clone(),
            workflow: req.workflow.clone(),
            is_active: req.is_active,
            created_at: now,
            updated_at: now,
        };

        // is_active is always bound so an explicit false never falls back to the column default
        sqlx::query(
            r#"
            INSERT INTO pipelines (
                id, project_id, name, description, workflow, is_active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(pipeline.id)
        .bind(pipeline.project_id)
        .bind(&pipeline.name)
        .bind(&pipeline.description)
        .bind(&pipeline.workflow)
        .bind(pipeline.is_active)
        .bind(pipeline.created_at)
        .bind(pipeline.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(pipeline)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Pipeline>, RepositoryError> {
        let row = sqlx::query_as::<_, PipelineRow>(
            r#"
            SELECT id, project_id, name, description, workflow, is_active, created_at, updated_at
            FROM pipelines
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list(
        &self,
        filter: &PipelineFilter,
        page: PageRequest,
    ) -> Result<(Vec<Pipeline>, u64), RepositoryError> {
        // strpos keeps user input out of LIKE pattern syntax
        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM pipelines
            WHERE ($1::BIGINT IS NULL OR project_id = $1)
              AND ($2::TEXT IS NULL OR strpos(lower(name), lower($2)) > 0)
            "#,
        )
        .bind(filter.project_id)
        .bind(&filter.name)
        .fetch_one(&self.pool)
        .await?;

        let rows = sqlx::query_as::<_, PipelineRow>(
            r#"
            SELECT id, project_id, name, description, workflow, is_active, created_at, updated_at
            FROM pipelines
            WHERE ($1::BIGINT IS NULL OR project_id = $1)
              AND ($2::TEXT IS NULL OR strpos(lower(name), lower($2)) > 0)
            ORDER BY created_at DESC, id DESC
            LIMIT $3 OFFSET $4
            "#,
        )
        .bind(filter.project_id)
        .bind(&filter.name)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = u64::try_from(total).unwrap_or_default();
        Ok((rows.into_iter().map(|r| r.into()).collect(), total))
    }

    async fn update(&self, pipeline: &Pipeline) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE pipelines
            SET name = $1, description = $2, workflow = $3, is_active = $4, updated_at = $5
            WHERE id = $6
            "#,
        )
        .bind(&pipeline.name)
        .bind(&pipeline.description)
        .bind(&pipeline.workflow)
        .bind(pipeline.is_active)
        .bind(pipeline.updated_at)
        .bind(pipeline.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pipelines WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct PipelineRow {
    id: Uuid,
    project_id: i64,
    name: String,
    description: String,
    workflow: String,
    is_active: bool,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<PipelineRow> for Pipeline {
    fn from(row: PipelineRow) -> Self {
        Pipeline {
            id: row.id,
            project_id: row.project_id,
            name: row.name,
            description: row.description,
            workflow: row.workflow,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
