//! Project list and project route handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use cosmos_core::analytics::{self, ProjectTally, StatusTab};
use cosmos_core::project::{Project, ProjectInput};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::session::Session;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectQuery {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub tab: String,
}

/// A project row on the overview.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    #[serde(flatten)]
    pub tally: ProjectTally,
    pub completion_percent: u32,
}

pub async fn list_projects(
    State(state): State<AppState>,
    Query(query): Query<ProjectQuery>,
) -> ApiResult<Json<Vec<ProjectSummary>>> {
    let tab: StatusTab = query.tab.parse()?;
    let tallies = state.engine.project_tallies();
    let summaries = analytics::filter_projects(&tallies, &query.search, tab)
        .into_iter()
        .map(|tally| ProjectSummary {
            completion_percent: tally.completion_percent(),
            tally,
        })
        .collect();
    Ok(Json(summaries))
}

pub async fn create_project(
    State(state): State<AppState>,
    Session(role): Session,
    Json(input): Json<ProjectInput>,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let project = state.engine.gateway(role).create_project(input).await?;
    Ok((StatusCode::CREATED, Json(project)))
}

pub async fn delete_project(
    State(state): State<AppState>,
    Session(role): Session,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state.engine.gateway(role).delete_project(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
