//! Build API Handlers
//!
//! HTTP endpoints for triggering builds and reading their history.

use axum::{
    Json,
    body::Bytes,
    extract::{
        Path, Query, State,
        rejection::{PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use conveyor_core::domain::build::{Build, BuildSnapshot};
use conveyor_core::dto::build::{ListBuilds, TriggerBuild};
use conveyor_core::dto::page::Page;
use uuid::Uuid;

use super::AppState;
use crate::api::error::ApiResult;
use crate::auth::Actor;

/// POST /pipeline/{id}/build
/// Trigger a build of a pipeline
///
/// Every field of the request is optional, so an empty body triggers with
/// defaults.
pub async fn trigger_build(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Build>)> {
    let Path(pipeline_id) = path?;
    let req = if body.iter().all(u8::is_ascii_whitespace) {
        TriggerBuild::default()
    } else {
        let Json(req) = Json::<TriggerBuild>::from_bytes(&body)?;
        req
    };
    tracing::info!("Triggering build of pipeline: {}", pipeline_id);

    let build = state.builds.trigger(&actor, pipeline_id, req).await?;

    Ok((StatusCode::CREATED, Json(build)))
}

/// GET /pipeline/{id}/builds
/// List builds of a pipeline
pub async fn list_builds(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListBuilds>, QueryRejection>,
) -> ApiResult<Json<Page<Build>>> {
    let Path(pipeline_id) = path?;
    let Query(query) = query?;
    tracing::debug!("Listing builds of pipeline: {}", pipeline_id);

    let page = state.builds.list_builds(&actor, pipeline_id, query).await?;

    Ok(Json(page))
}

/// GET /build/{id}
pub async fn get_build(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Build>> {
    let Path(id) = path?;
    let build = state.builds.get_build(&actor, id).await?;
    Ok(Json(build))
}

/// GET /build/{id}/snapshot
/// Workflow the build was triggered with
pub async fn get_snapshot(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<BuildSnapshot>> {
    let Path(id) = path?;
    let snapshot = state.builds.get_snapshot(&actor, id).await?;
    Ok(Json(snapshot))
}

/// GET /build/unsnapshotted
/// Pending builds recorded without a snapshot
pub async fn list_unsnapshotted(
    State(state): State<AppState>,
    actor: Actor,
) -> ApiResult<Json<Vec<Build>>> {
    let builds = state.builds.unsnapshotted_builds(&actor).await?;
    Ok(Json(builds))
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{json, router, send};
    use crate::testing::*;
    use axum::http::{Method, StatusCode};
    use conveyor_core::digest::workflow_sha256;
    use conveyor_core::domain::build::{Build, BuildSnapshot, BuildStatus};
    use conveyor_core::dto::error::{ErrorBody, ErrorCode};
    use conveyor_core::dto::page::Page;
    use serde_json::json;

    const WORKFLOW: &str = "steps: [...]";

    #[tokio::test]
    async fn test_trigger_then_read_back() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", WORKFLOW).await;

        let body = json!({
            "commit_sha": "abc123",
            "branch": "main",
            "variables": { "ENV": "prod" }
        });
        let uri = format!("/pipeline/{}/build", pipeline.id);
        let response = send(router(&h), Method::POST, &uri, Some(&owner()), Some(body)).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let build: Build = json(response).await;
        assert_eq!(build.status, BuildStatus::Pending);
        assert_eq!(build.commit_sha.as_deref(), Some("abc123"));
        assert_eq!(build.branch.as_deref(), Some("main"));

        let uri = format!("/build/{}/snapshot", build.id);
        let response = send(router(&h), Method::GET, &uri, Some(&member()), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let snapshot: BuildSnapshot = json(response).await;
        assert_eq!(snapshot.workflow, WORKFLOW);
        assert_eq!(snapshot.workflow_sha256, workflow_sha256(WORKFLOW));

        let uri = format!("/pipeline/{}/builds", pipeline.id);
        let response = send(router(&h), Method::GET, &uri, Some(&member()), None).await;
        let page: Page<Build> = json(response).await;
        assert_eq!(page.items, vec![build]);
    }

    #[tokio::test]
    async fn test_trigger_by_member_is_forbidden() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", WORKFLOW).await;

        let uri = format!("/pipeline/{}/build", pipeline.id);
        let response = send(router(&h), Method::POST, &uri, Some(&member()), Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let error: ErrorBody = json(response).await;
        assert_eq!(error.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_invalid_variables_are_bad_request() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", WORKFLOW).await;

        let body = json!({ "variables": { "": "x" } });
        let uri = format!("/pipeline/{}/build", pipeline.id);
        let response = send(router(&h), Method::POST, &uri, Some(&owner()), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorBody = json(response).await;
        assert_eq!(error.code, ErrorCode::InvalidArgument);
    }

    #[tokio::test]
    async fn test_no_queue_is_precondition_failed() {
        let h = Harness::without_queue();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", WORKFLOW).await;

        let uri = format!("/pipeline/{}/build", pipeline.id);
        let response = send(router(&h), Method::POST, &uri, Some(&owner()), Some(json!({}))).await;
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
        let error: ErrorBody = json(response).await;
        assert_eq!(error.code, ErrorCode::FailedPrecondition);
    }

    #[tokio::test]
    async fn test_unsnapshotted_route_is_not_a_build_id() {
        let h = Harness::new();

        let response = send(router(&h), Method::GET, "/build/unsnapshotted", Some(&root()), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let builds: Vec<Build> = json(response).await;
        assert!(builds.is_empty());

        let response = send(router(&h), Method::GET, "/build/unsnapshotted", Some(&owner()), None).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_trigger_without_body_uses_defaults() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", WORKFLOW).await;

        let uri = format!("/pipeline/{}/build", pipeline.id);
        let response = send(router(&h), Method::POST, &uri, Some(&owner()), None).await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let build: Build = json(response).await;
        assert_eq!(build.triggered_by, "olivia");
        assert_eq!(build.commit_sha, None);
        assert!(build.variables.is_empty());
        assert_eq!(h.queue.jobs().len(), 1);
    }

    #[tokio::test]
    async fn test_non_string_variable_is_bad_request() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", WORKFLOW).await;

        let body = json!({ "variables": { "RETRIES": 3 } });
        let uri = format!("/pipeline/{}/build", pipeline.id);
        let response = send(router(&h), Method::POST, &uri, Some(&owner()), Some(body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorBody = json(response).await;
        assert_eq!(error.code, ErrorCode::InvalidArgument);
        assert!(h.build_repo.builds().is_empty());
    }

    #[tokio::test]
    async fn test_non_uuid_id_is_bad_request() {
        let h = Harness::new();

        for (method, uri) in [
            (Method::POST, "/pipeline/not-a-uuid/build"),
            (Method::GET, "/pipeline/not-a-uuid/builds"),
            (Method::GET, "/build/12345"),
            (Method::GET, "/build/12345/snapshot"),
        ] {
            let response = send(router(&h), method, uri, Some(&owner()), None).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let error: ErrorBody = json(response).await;
            assert_eq!(error.code, ErrorCode::InvalidArgument, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_unknown_build_is_not_found() {
        let h = Harness::new();
        let uri = format!("/build/{}", uuid::Uuid::new_v4());
        let response = send(router(&h), Method::GET, &uri, Some(&owner()), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
