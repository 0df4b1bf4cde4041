//! Schedule API Handlers
//!
//! HTTP endpoints for the cron schedules of a pipeline.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use conveyor_core::domain::schedule::PipelineSchedule;
use conveyor_core::dto::page::Page;
use conveyor_core::dto::schedule::{CreateSchedule, ListSchedules, UpdateSchedule};
use uuid::Uuid;

use super::AppState;
use crate::api::error::ApiResult;
use crate::auth::Actor;

/// POST /pipeline/{id}/schedules
pub async fn create_schedule(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<CreateSchedule>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<PipelineSchedule>)> {
    let Path(pipeline_id) = path?;
    let Json(req) = payload?;
    tracing::info!("Creating schedule of pipeline {}: {}", pipeline_id, req.cron);

    let schedule = state.schedules.create(&actor, pipeline_id, req).await?;

    Ok((StatusCode::CREATED, Json(schedule)))
}

/// GET /pipeline/{id}/schedules
pub async fn list_schedules(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
    query: Result<Query<ListSchedules>, QueryRejection>,
) -> ApiResult<Json<Page<PipelineSchedule>>> {
    let Path(pipeline_id) = path?;
    let Query(query) = query?;

    let page = state.schedules.list(&actor, pipeline_id, query).await?;

    Ok(Json(page))
}

/// PUT /pipeline/{id}/schedules/{schedule_id}
pub async fn update_schedule(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
    payload: Result<Json<UpdateSchedule>, JsonRejection>,
) -> ApiResult<Json<PipelineSchedule>> {
    let Path((pipeline_id, schedule_id)) = path?;
    let Json(req) = payload?;
    tracing::info!("Updating schedule: {}", schedule_id);

    let schedule = state
        .schedules
        .update(&actor, pipeline_id, schedule_id, req)
        .await?;

    Ok(Json(schedule))
}

/// DELETE /pipeline/{id}/schedules/{schedule_id}
pub async fn delete_schedule(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path((pipeline_id, schedule_id)) = path?;
    tracing::info!("Deleting schedule: {}", schedule_id);

    state
        .schedules
        .delete(&actor, pipeline_id, schedule_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::api::tests::{json, router, send};
    use crate::testing::*;
    use axum::http::{Method, StatusCode};
    use conveyor_core::domain::schedule::PipelineSchedule;
    use conveyor_core::dto::error::{ErrorBody, ErrorCode};
    use conveyor_core::dto::page::Page;
    use serde_json::json;

    #[tokio::test]
    async fn test_schedule_lifecycle() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", "").await;
        let uri = format!("/pipeline/{}/schedules", pipeline.id);

        let response = send(
            router(&h),
            Method::POST,
            &uri,
            Some(&admin()),
            Some(json!({ "cron": "0 2 1 * *" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let created: PipelineSchedule = json(response).await;
        assert_eq!(created.timezone, "UTC");
        assert!(created.enabled);

        let response = send(router(&h), Method::GET, &uri, Some(&member()), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        let page: Page<PipelineSchedule> = json(response).await;
        assert_eq!(page.items, vec![created.clone()]);

        let item_uri = format!("{uri}/{}", created.id);
        let response = send(
            router(&h),
            Method::PUT,
            &item_uri,
            Some(&owner()),
            Some(json!({ "cron": "30 3 * * 1", "enabled": false })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let updated: PipelineSchedule = json(response).await;
        assert_eq!(updated.cron, "30 3 * * 1");
        assert!(!updated.enabled);

        let response = send(router(&h), Method::DELETE, &item_uri, Some(&owner()), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);

        let response = send(router(&h), Method::DELETE, &item_uri, Some(&owner()), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_member_cannot_create() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", "").await;
        let uri = format!("/pipeline/{}/schedules", pipeline.id);

        let response = send(
            router(&h),
            Method::POST,
            &uri,
            Some(&member()),
            Some(json!({ "cron": "0 2 * * *" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let error: ErrorBody = json(response).await;
        assert_eq!(error.code, ErrorCode::PermissionDenied);
    }

    #[tokio::test]
    async fn test_update_without_enabled_is_invalid() {
        let h = Harness::new();
        let pipeline = h.seed_pipeline(PROJECT, "build-web", "").await;
        let uri = format!("/pipeline/{}/schedules/{}", pipeline.id, uuid::Uuid::new_v4());

        let response = send(
            router(&h),
            Method::PUT,
            &uri,
            Some(&owner()),
            Some(json!({ "cron": "0 2 * * *" })),
        )
        .await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: ErrorBody = json(response).await;
        assert_eq!(error.code, ErrorCode::InvalidArgument);
    }
}
