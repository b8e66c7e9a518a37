//! Cosmos Core Library
//!
//! Live sync and aggregation engine for the project dashboard: entity cache,
//! change feed, permission-gated mutations, analytics and the kanban board.

pub mod analytics;
pub mod board;
pub mod cache;
pub mod engine;
pub mod error;
pub mod feed;
pub mod gateway;
pub mod project;
pub mod session;
pub mod store;
pub mod task;
pub mod team;
pub mod time;

pub use engine::Engine;
pub use error::{CosmosError, CosmosResult};
