//! Team route handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use cosmos_core::team::{MemberInput, TeamMember};

use crate::error::ApiResult;
use crate::session::Session;
use crate::state::AppState;

pub async fn list_team(State(state): State<AppState>) -> Json<Vec<TeamMember>> {
    Json(state.engine.cache().team())
}

pub async fn create_member(
    State(state): State<AppState>,
    Session(role): Session,
    Json(input): Json<MemberInput>,
) -> ApiResult<(StatusCode, Json<TeamMember>)> {
    let member = state.engine.gateway(role).create_team_member(input).await?;
    Ok((StatusCode::CREATED, Json(member)))
}

pub async fn update_member(
    State(state): State<AppState>,
    Session(role): Session,
    Path(id): Path<String>,
    Json(input): Json<MemberInput>,
) -> ApiResult<Json<TeamMember>> {
    let member = state.engine.gateway(role).update_team_member(&id, input).await?;
    Ok(Json(member))
}

pub async fn delete_member(
    State(state): State<AppState>,
    Session(role): Session,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.engine.gateway(role).delete_team_member(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
