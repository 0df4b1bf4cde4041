//! Build queue gateway
//!
//! Hands triggered builds to the executor. The orchestrator only submits
//! jobs; executors own everything that happens after.

mod http;
mod postgres;

use async_trait::async_trait;
use conveyor_core::dto::build::BuildJob;

pub use http::HttpBuildQueue;
pub use postgres::PgBuildQueue;

/// Queue error type
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("queue database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("queue request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The executor answered with a non-success status
    #[error("queue rejected job ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// Destination for triggered builds
#[async_trait]
pub trait BuildQueue: Send + Sync {
    /// Submit one job. Called at most once per triggered build.
    async fn enqueue(&self, job: BuildJob) -> Result<(), QueueError>;
}
