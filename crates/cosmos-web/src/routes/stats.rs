//! Dashboard header figures.

use axum::{extract::State, Json};
use chrono::Utc;
use cosmos_core::analytics::DashboardStats;

use crate::state::AppState;

pub async fn get_stats(State(state): State<AppState>) -> Json<DashboardStats> {
    Json(state.engine.stats(Utc::now()))
}
