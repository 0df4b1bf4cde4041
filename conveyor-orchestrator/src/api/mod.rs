//! API Module
//!
//! HTTP API layer for the orchestrator.
//! Each submodule handles endpoints for a specific domain. Handlers take the
//! caller's identity from the gateway headers through the [`Actor`]
//! extractor and delegate everything else to the services.
//!
//! [`Actor`]: crate::auth::Actor

pub mod build;
pub mod error;
pub mod pipeline;
pub mod schedule;

use axum::{
    Router,
    http::StatusCode,
    routing::{get, post, put},
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::service::{BuildService, PipelineService, ScheduleService};

/// Shared state of every handler
#[derive(Clone)]
pub struct AppState {
    pub pipelines: Arc<PipelineService>,
    pub builds: Arc<BuildService>,
    pub schedules: Arc<ScheduleService>,
}

/// Create the main API router with all endpoints
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Pipeline endpoints
        .route("/pipeline/create", post(pipeline::create_pipeline))
        .route("/pipeline/list", get(pipeline::list_pipelines))
        .route(
            "/pipeline/{id}",
            get(pipeline::get_pipeline)
                .put(pipeline::update_pipeline)
                .delete(pipeline::delete_pipeline),
        )
        .route("/pipeline/{id}/build", post(build::trigger_build))
        .route("/pipeline/{id}/builds", get(build::list_builds))
        // Schedule endpoints
        .route(
            "/pipeline/{id}/schedules",
            get(schedule::list_schedules).post(schedule::create_schedule),
        )
        .route(
            "/pipeline/{id}/schedules/{schedule_id}",
            put(schedule::update_schedule).delete(schedule::delete_schedule),
        )
        // Build endpoints
        .route("/build/unsnapshotted", get(build::list_unsnapshotted))
        .route("/build/{id}", get(build::get_build))
        .route("/build/{id}/snapshot", get(build::get_snapshot))
        // Add state and middleware
        .with_state(state)
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            request_timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

/// GET /health
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::auth::identity::{USER_ID_HEADER, USER_ROLE_HEADER, USERNAME_HEADER};
    use crate::auth::Actor;
    use crate::testing::Harness;
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use axum::response::Response;
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use tower::ServiceExt;

    pub fn router(h: &Harness) -> Router {
        let state = AppState {
            pipelines: h.pipelines.clone(),
            builds: h.builds.clone(),
            schedules: h.schedules.clone(),
        };
        create_router(state, Duration::from_secs(5))
    }

    /// Send one request as `actor` (or anonymously) with an optional JSON body
    pub async fn send(
        router: Router,
        method: Method,
        uri: &str,
        actor: Option<&Actor>,
        body: Option<serde_json::Value>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(USER_ID_HEADER, actor.user_id.to_string());
            if let Some(name) = &actor.username {
                builder = builder.header(USERNAME_HEADER, name);
            }
            if actor.super_admin {
                builder = builder.header(USER_ROLE_HEADER, "USER_ROLE_SUPER_ADMIN");
            }
        }

        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        router.oneshot(request).await.unwrap()
    }

    pub async fn json<T: DeserializeOwned>(response: Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let h = Harness::new();
        let response = send(router(&h), Method::GET, "/health", None, None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&bytes[..], b"OK");
    }
}
