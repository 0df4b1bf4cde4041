//! Build Repository
//!
//! Handles all database operations related to builds and their workflow
//! snapshots.

use async_trait::async_trait;
use conveyor_core::domain::build::{Build, BuildSnapshot, BuildStatus};
use conveyor_core::dto::page::PageRequest;
use sqlx::types::Json;
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use uuid::Uuid;

use super::{BuildRepository, RecordError, RepositoryError};

/// Postgres implementation of [`BuildRepository`]
///
/// Builds and snapshots are written in one transaction.
#[derive(Debug, Clone)]
pub struct PgBuildRepository {
    pool: PgPool,
}

impl PgBuildRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BuildRepository for PgBuildRepository {
    async fn record(&self, build: &Build, snapshot: &BuildSnapshot) -> Result<(), RecordError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| RecordError::Build(e.into()))?;

        insert_build(&mut tx, build)
            .await
            .map_err(RecordError::Build)?;

        // Dropping the transaction on error rolls the build back
        insert_snapshot(&mut tx, snapshot)
            .await
            .map_err(|source| RecordError::Snapshot {
                build_id: build.id,
                build_committed: false,
                source,
            })?;

        tx.commit()
            .await
            .map_err(|e| RecordError::Build(e.into()))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Build>, RepositoryError> {
        let row = sqlx::query_as::<_, BuildRow>(
            r#"
            SELECT id, pipeline_id, name, status, triggered_by, commit_sha, branch,
                   variables, created_at, started_at, finished_at
            FROM builds
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Build::try_from).transpose()
    }

    async fn find_snapshot(&self, build_id: Uuid) -> Result<Option<BuildSnapshot>, RepositoryError> {
        let row = sqlx::query_as::<_, SnapshotRow>(
            r#"
            SELECT id, build_id, pipeline_id, name, workflow, workflow_sha256, created_at
            FROM build_snapshots
            WHERE build_id = $1
            "#,
        )
        .bind(build_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into()))
    }

    async fn list_by_pipeline(
        &self,
        pipeline_id: Uuid,
        page: PageRequest,
    ) -> Result<(Vec<Build>, u64), RepositoryError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM builds WHERE pipeline_id = $1")
            .bind(pipeline_id)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, BuildRow>(
            r#"
            SELECT id, pipeline_id, name, status, triggered_by, commit_sha, branch,
                   variables, created_at, started_at, finished_at
            FROM builds
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

        let builds = rows
            .into_iter()
            .map(Build::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        let total = u64::try_from(total).unwrap_or_default();
        Ok((builds, total))
    }

    async fn list_unsnapshotted(&self, limit: i64) -> Result<Vec<Build>, RepositoryError> {
        let rows = sqlx::query_as::<_, BuildRow>(
            r#"
            SELECT b.id, b.pipeline_id, b.name, b.status, b.triggered_by, b.commit_sha, b.branch,
                   b.variables, b.created_at, b.started_at, b.finished_at
            FROM builds b
            LEFT JOIN build_snapshots s ON s.build_id = b.id
            WHERE s.id IS NULL AND b.status = $1
            ORDER BY b.created_at ASC
            LIMIT $2
            "#,
        )
        .bind(BuildStatus::Pending.as_str())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Build::try_from).collect()
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

async fn insert_build(conn: &mut PgConnection, build: &Build) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO builds (
            id, pipeline_id, name, status, triggered_by, commit_sha, branch,
            variables, created_at, started_at, finished_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(build.id)
    .bind(build.pipeline_id)
    .bind(&build.name)
    .bind(build.status.as_str())
    .bind(&build.triggered_by)
    .bind(&build.commit_sha)
    .bind(&build.branch)
    .bind(Json(&build.variables))
    .bind(build.created_at)
    .bind(build.started_at)
    .bind(build.finished_at)
    .execute(conn)
    .await?;

    Ok(())
}

async fn insert_snapshot(
    conn: &mut PgConnection,
    snapshot: &BuildSnapshot,
) -> Result<(), RepositoryError> {
    sqlx::query(
        r#"
        INSERT INTO build_snapshots (
            id, build_id, pipeline_id, name, workflow, workflow_sha256, created_at
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(snapshot.id)
    .bind(snapshot.build_id)
    .bind(snapshot.pipeline_id)
    .bind(&snapshot.name)
    .bind(&snapshot.workflow)
    .bind(&snapshot.workflow_sha256)
    .bind(snapshot.created_at)
    .execute(conn)
    .await?;

    Ok(())
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct BuildRow {
    id: Uuid,
    pipeline_id: Uuid,
    name: String,
    status: String,
    triggered_by: String,
    commit_sha: Option<String>,
    branch: Option<String>,
    variables: Json<HashMap<String, String>>,
    created_at: chrono::DateTime<chrono::Utc>,
    started_at: Option<chrono::DateTime<chrono::Utc>>,
    finished_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl TryFrom<BuildRow> for Build {
    type Error = RepositoryError;

    fn try_from(row: BuildRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<BuildStatus>()
            .map_err(|e| RepositoryError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(Build {
            id: row.id,
            pipeline_id: row.pipeline_id,
            name: row.name,
            status,
            triggered_by: row.triggered_by,
            commit_sha: row.commit_sha,
            branch: row.branch,
            variables: row.variables.0,
            created_at: row.created_at,
            started_at: row.started_at,
            finished_at: row.finished_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SnapshotRow {
    id: Uuid,
    build_id: Uuid,
    pipeline_id: Uuid,
    name: String,
    workflow: String,
    workflow_sha256: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<SnapshotRow> for BuildSnapshot {
    fn from(row: SnapshotRow) -> Self {
        BuildSnapshot {
            id: row.id,
            build_id: row.build_id,
            pipeline_id: row.pipeline_id,
            name: row.name,
            workflow: row.workflow,
            workflow_sha256: row.workflow_sha256,
            created_at: row.created_at,
        }
    }
}
