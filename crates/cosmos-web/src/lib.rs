//! Cosmos Web Server
//!
//! Axum-based JSON API over the live engine, plus a WebSocket that pushes
//! cache refreshes to dashboards.

pub mod error;
pub mod routes;
pub mod session;
pub mod state;
pub mod websocket;

use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use cosmos_core::Engine;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        // Overview
        .route(
            "/projects",
            get(routes::projects::list_projects).post(routes::projects::create_project),
        )
        .route("/projects/{id}", delete(routes::projects::delete_project))
        .route("/stats", get(routes::stats::get_stats))
        // Tasks
        .route("/tasks", get(routes::tasks::list_tasks).post(routes::tasks::create_task))
        .route(
            "/tasks/{id}",
            put(routes::tasks::update_task).delete(routes::tasks::delete_task),
        )
        // Board
        .route("/board", get(routes::board::get_all_board))
        .route("/board/drop", post(routes::board::drop_all_card))
        .route("/board/{project_id}", get(routes::board::get_board))
        .route("/board/{project_id}/drop", post(routes::board::drop_card))
        // Team
        .route("/team", get(routes::team::list_team).post(routes::team::create_member))
        .route(
            "/team/{id}",
            put(routes::team::update_member).delete(routes::team::delete_member),
        )
        .with_state(state.clone());

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(websocket::ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Run the web server until it fails or the process exits.
pub async fn run_server(engine: Arc<Engine>, host: &str, port: u16) -> anyhow::Result<()> {
    let state = AppState::new(engine);
    let app = create_router(state);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Web server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
