//! Pipeline API Handlers
//!
//! HTTP endpoints for pipeline management.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
};
use conveyor_core::domain::pipeline::Pipeline;
use conveyor_core::dto::page::Page;
use conveyor_core::dto::pipeline::{CreatePipeline, ListPipelines, UpdatePipeline};
use uuid::Uuid;

use super::AppState;
use crate::api::error::ApiResult;
use crate::auth::Actor;

/// POST /pipeline/create
/// Create a new pipeline
pub async fn create_pipeline(
    State(state): State<AppState>,
    actor: Actor,
    payload: Result<Json<CreatePipeline>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Pipeline>)> {
    let Json(req) = payload?;
    tracing::info!("Creating pipeline: {}", req.name);

    let pipeline = state.pipelines.create(&actor, req).await?;

    Ok((StatusCode::CREATED, Json(pipeline)))
}

/// GET /pipeline/list
/// List pipelines of a project
pub async fn list_pipelines(
    State(state): State<AppState>,
    actor: Actor,
    query: Result<Query<ListPipelines>, QueryRejection>,
) -> ApiResult<Json<Page<Pipeline>>> {
    let Query(query) = query?;
    tracing::debug!("Listing pipelines: {:?}", query);

    let page = state.pipelines.list(&actor, query).await?;

    Ok(Json(page))
}

/// GET /pipeline/{id}
/// Get pipeline by ID
pub async fn get_pipeline(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Pipeline>> {
    let Path(id) = path?;
    tracing::debug!("Getting pipeline: {}", id);

    let pipeline = state.pipelines.get(&actor, id).await?;

    Ok(Json(pipeline))
}

/// PUT /pipeline/{id}
/// Update a pipeline
pub async fn update_pipeline(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdatePipeline>, JsonRejection>,
) -> ApiResult<Json<Pipeline>> {
    let Path(id) = path?;
    let Json(req) = payload?;
    tracing::info!("Updating pipeline: {}", id);

    let pipeline = state.pipelines.update(&actor, id, req).await?;

    Ok(Json(pipeline))
}

/// DELETE /pipeline/{id}
/// Delete a pipeline
pub async fn delete_pipeline(
    State(state): State<AppState>,
    actor: Actor,
    path: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = path?;
    tracing::info!("Deleting pipeline: {}", id);

    state.pipelines.delete(&actor, id).await?;

    Ok(StatusCode::NO_CONTENT)
}
