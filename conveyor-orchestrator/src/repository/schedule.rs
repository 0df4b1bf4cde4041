//! Schedule Repository
//!
//! Handles all database operations related to pipeline schedules.

use async_trait::async_trait;
use conveyor_core::domain::schedule::PipelineSchedule;
use conveyor_core::dto::page::PageRequest;
use sqlx::PgPool;
use uuid::Uuid;

use super::{RepositoryError, ScheduleRepository};

/// Postgres implementation of [`ScheduleRepository`]
#[derive(Debug, Clone)]
pub struct PgScheduleRepository {
    pool: PgPool,
}

impl PgScheduleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ScheduleRepository for PgScheduleRepository {
    async fn create(&self, schedule: &PipelineSchedule) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO pipeline_schedules (
                id, pipeline_id, cron, timezone, enabled, last_triggered_at, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(schedule.id)
        .bind(schedule.pipeline_id)
        .bind(&schedule.cron)
        .bind(&schedule.timezone)
        .bind(schedule.enabled)
        .bind(schedule.last_triggered_at)
        .bind(schedule.created_at)
        .bind(schedule.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find(
        &self,
        pipeline_id: Uuid,
        schedule_id: Uuid,
    ) -> Result<Option<PipelineSchedule>, RepositoryError> {
        let row = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, pipeline_id, cron, timezone, enabled, last_triggered_at, created_at, updated_at
            FROM pipeline_schedules
            WHERE pipeline_id = $1 AND id = $2
            "#,
        )
        .bind(pipeline_id)
        .bind(schedule_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_pipeline(
        &self,
        pipeline_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<PipelineSchedule>, u64), RepositoryError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM pipeline_schedules WHERE pipeline_id = $1")
                .bind(pipeline_id)
                .fetch_one(&self.pool)
                .await?;

        let rows = sqlx::query_as::<_, ScheduleRow>(
            r#"
            SELECT id, pipeline_id, cron, timezone, enabled, last_triggered_at, created_at, updated_at
            FROM pipeline_schedules
            WHERE pipeline_id = $1
            ORDER BY created_at DESC, id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(pipeline_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = u64::try_from(total).unwrap_or_default();
        Ok((rows.into_iter().map(|r| r.into()).collect(), total))
    }

    async fn update(&self, schedule: &PipelineSchedule) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"
            UPDATE pipeline_schedules
            SET cron = $1, timezone = $2, enabled = $3, updated_at = $4
            WHERE pipeline_id = $5 AND id = $6
            "#,
        )
        .bind(&schedule.cron)
        .bind(&schedule.timezone)
        .bind(schedule.enabled)
        .bind(schedule.updated_at)
        .bind(schedule.pipeline_id)
        .bind(schedule.id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, pipeline_id: Uuid, schedule_id: Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM pipeline_schedules WHERE pipeline_id = $1 AND id = $2")
            .bind(pipeline_id)
            .bind(schedule_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[derive(sqlx::FromRow)]
struct ScheduleRow {
    id: Uuid,
    pipeline_id: Uuid,
    cron: String,
    timezone: String,
    enabled: bool,
    last_triggered_at: Option<chrono::DateTime<chrono::Utc>>,
    created_at: chrono::DateTime<chrono::Utc>,
    updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<ScheduleRow> for PipelineSchedule {
    fn from(row: ScheduleRow) -> Self {
        PipelineSchedule {
            id: row.id,
            pipeline_id: row.pipeline_id,
            cron: row.cron,
            timezone: row.timezone,
            enabled: row.enabled,
            last_triggered_at: row.last_triggered_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
