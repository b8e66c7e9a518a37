//! Task route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cosmos_core::task::{Task, TaskInput};

use crate::error::ApiResult;
use crate::session::Session;
use crate::state::AppState;

pub async fn list_tasks(State(state): State<AppState>) -> Json<Vec<Task>> {
    Json(state.engine.cache().tasks())
}

pub async fn create_task(
    State(state): State<AppState>,
    Session(role): Session,
    Json(input): Json<TaskInput>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    let task = state.engine.gateway(role).create_task(input).await?;
    Ok((StatusCode::CREATED, Json(task)))
}

pub async fn update_task(
    State(state): State<AppState>,
    Session(role): Session,
    Path(id): Path<String>,
    Json(input): Json<TaskInput>,
) -> ApiResult<Json<Task>> {
    let task = state.engine.gateway(role).update_task(&id, input).await?;
    Ok(Json(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Session(role): Session,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.engine.gateway(role).delete_task(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
