use sqlx::{PgPool, postgres::PgPoolOptions};
use std::time::Duration;

pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    // Create pipelines table
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipelines (
            id UUID PRIMARY KEY,
            project_id BIGINT NOT NULL,
            name VARCHAR(255) NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            workflow TEXT NOT NULL DEFAULT '',
            is_active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL,
            CONSTRAINT uq_pipelines_project_name UNIQUE (project_id, name)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Builds outlive their pipeline, so there is no foreign key to pipelines
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS builds (
            id UUID PRIMARY KEY,
            pipeline_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            status VARCHAR(32) NOT NULL,
            triggered_by TEXT NOT NULL,
            commit_sha TEXT,
            branch TEXT,
            variables JSONB NOT NULL DEFAULT '{}',
            created_at TIMESTAMPTZ NOT NULL,
            started_at TIMESTAMPTZ,
            finished_at TIMESTAMPTZ
        )
        "#,
    )
    .execute(pool)
    .await?;

    // One snapshot per build
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS build_snapshots (
            id UUID PRIMARY KEY,
            build_id UUID NOT NULL REFERENCES builds(id) ON DELETE CASCADE,
            pipeline_id UUID NOT NULL,
            name VARCHAR(255) NOT NULL,
            workflow TEXT NOT NULL,
            workflow_sha256 CHAR(64) NOT NULL,
            created_at TIMESTAMPTZ NOT NULL,
            CONSTRAINT uq_build_snapshots_build_id UNIQUE (build_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Schedules go away with their pipeline
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pipeline_schedules (
            id UUID PRIMARY KEY,
            pipeline_id UUID NOT NULL REFERENCES pipelines(id) ON DELETE CASCADE,
            cron VARCHAR(128) NOT NULL,
            timezone VARCHAR(64) NOT NULL DEFAULT 'UTC',
            enabled BOOLEAN NOT NULL DEFAULT TRUE,
            last_triggered_at TIMESTAMPTZ,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Durable handoff table used by the postgres build queue
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS build_queue (
            id BIGSERIAL PRIMARY KEY,
            build_id UUID NOT NULL,
            pipeline_id UUID NOT NULL,
            project_id BIGINT NOT NULL,
            payload JSONB NOT NULL,
            enqueued_at TIMESTAMPTZ NOT NULL,
            CONSTRAINT uq_build_queue_build_id UNIQUE (build_id)
        )
        "#,
    )
    .execute(pool)
    .await?;

    // Create indexes for better query performance
    sqlx::query("CREATE INDEX IF NOT EXISTS idx_pipelines_project_id ON pipelines(project_id)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_builds_pipeline_created ON builds(pipeline_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_builds_status ON builds(status)")
        .execute(pool)
        .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_build_snapshots_sha256 ON build_snapshots(workflow_sha256)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_pipeline_schedules_pipeline_created ON pipeline_schedules(pipeline_id, created_at DESC)",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_build_queue_enqueued_at ON build_queue(enqueued_at)")
        .execute(pool)
        .await?;

    tracing::info!("Database migrations completed successfully");
    Ok(())
}
