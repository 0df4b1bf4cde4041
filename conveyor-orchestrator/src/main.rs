use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod directory;
pub mod queue;
pub mod repository;
pub mod service;
#[cfg(test)]
mod testing;

use auth::{AccessGate, DirectoryAccessGate};
use config::{Config, QueueConfig};
use directory::HttpProjectDirectory;
use queue::{BuildQueue, HttpBuildQueue, PgBuildQueue};
use repository::{PgBuildRepository, PgPipelineRepository, PgScheduleRepository};
use service::{BuildService, PipelineService, ScheduleService};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conveyor_orchestrator=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Conveyor Orchestrator...");

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    tracing::info!("Connecting to database...");

    // Create database connection pool
    let pool = db::create_pool(&config.database_url, config.db_max_connections)
        .await
        .context("Failed to create database pool")?;

    tracing::info!("Database connection pool created");

    // Run migrations
    db::run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let http = reqwest::Client::builder()
        .timeout(config.request_timeout)
        .build()
        .context("Failed to build HTTP client")?;

    let directory = Arc::new(HttpProjectDirectory::new(
        &config.project_directory_url,
        http.clone(),
    ));
    let gate: Arc<dyn AccessGate> = Arc::new(DirectoryAccessGate::new(directory));

    let queue: Option<Arc<dyn BuildQueue>> = match &config.queue {
        QueueConfig::Disabled => {
            tracing::warn!("No build queue configured, triggers will fail after recording");
            None
        }
        QueueConfig::Postgres => {
            tracing::info!("Build queue: postgres table build_queue");
            Some(Arc::new(PgBuildQueue::new(pool.clone())))
        }
        QueueConfig::Http { url } => {
            tracing::info!("Build queue: {}", url);
            Some(Arc::new(HttpBuildQueue::new(url.clone(), http.clone())))
        }
    };

    let pipeline_repo = Arc::new(PgPipelineRepository::new(pool.clone()));
    let build_repo = Arc::new(PgBuildRepository::new(pool.clone()));
    let schedule_repo = Arc::new(PgScheduleRepository::new(pool));

    let state = api::AppState {
        pipelines: Arc::new(PipelineService::new(pipeline_repo.clone(), gate.clone())),
        builds: Arc::new(BuildService::new(
            pipeline_repo.clone(),
            build_repo,
            gate.clone(),
            queue,
        )),
        schedules: Arc::new(ScheduleService::new(pipeline_repo, schedule_repo, gate)),
    };

    // Build router with all API endpoints
    let app = api::create_router(state, config.request_timeout);

    tracing::info!("Listening on {}", config.bind_addr);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Conveyor Orchestrator stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutdown signal received");
}
