//! Application state.

use std::sync::Arc;

use cosmos_core::cache::CacheEvent;
use cosmos_core::Engine;
use serde::{Deserialize, Serialize};

/// WebSocket message types.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum WebSocketMessage {
    /// The cache swapped in a new snapshot; clients should re-read.
    CacheRefreshed { revision: u64 },
}

impl From<CacheEvent> for WebSocketMessage {
    fn from(event: CacheEvent) -> Self {
        match event {
            CacheEvent::Refreshed { revision } => Self::CacheRefreshed { revision },
        }
    }
}

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<Engine>,
}

impl AppState {
    pub fn new(engine: Arc<Engine>) -> Self {
        Self { engine }
    }
}
