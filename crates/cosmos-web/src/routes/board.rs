//! Kanban board route handlers.
//!
//! `/board` is the all-projects board; `/board/{project_id}` narrows it to
//! one project.

use axum::{
    extract::{Path, State},
    Json,
};
use cosmos_core::board::{Board, DropOutcome};
use cosmos_core::session::SessionRole;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct BoardView {
    pub can_drag: bool,
    #[serde(flatten)]
    pub board: Board,
}

#[derive(Debug, Deserialize)]
pub struct DropRequest {
    pub task_id: String,
    /// Column the card was released over, if any.
    #[serde(default)]
    pub destination: Option<String>,
}

fn view(state: &AppState, project_id: Option<&str>, role: SessionRole) -> BoardView {
    let session = state.engine.board(project_id, role);
    BoardView {
        can_drag: session.can_drag(),
        board: session.board(),
    }
}

async fn drop_into(
    state: &AppState,
    project_id: Option<&str>,
    role: SessionRole,
    req: DropRequest,
) -> DropOutcome {
    let session = state.engine.board(project_id, role);
    let outcome = session.drop_card(&req.task_id, req.destination.as_deref()).await;
    debug!(project_id = project_id.unwrap_or("*"), task_id = %req.task_id, ?outcome, "Card dropped");
    outcome
}

pub async fn get_all_board(State(state): State<AppState>, Session(role): Session) -> Json<BoardView> {
    Json(view(&state, None, role))
}

pub async fn get_board(
    State(state): State<AppState>,
    Session(role): Session,
    Path(project_id): Path<String>,
) -> Json<BoardView> {
    Json(view(&state, Some(&project_id), role))
}

pub async fn drop_all_card(
    State(state): State<AppState>,
    Session(role): Session,
    Json(req): Json<DropRequest>,
) -> Json<DropOutcome> {
    Json(drop_into(&state, None, role, req).await)
}

pub async fn drop_card(
    State(state): State<AppState>,
    Session(role): Session,
    Path(project_id): Path<String>,
    Json(req): Json<DropRequest>,
) -> Json<DropOutcome> {
    Json(drop_into(&state, Some(&project_id), role, req).await)
}
