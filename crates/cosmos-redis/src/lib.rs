//! Cosmos Redis Data Layer
//!
//! Async Redis-backed rows for projects, tasks and team members, plus the
//! per-table change channels that mutations publish on.

pub mod broadcast;
pub mod client;
pub mod queries;

pub use broadcast::{
    ChangeEvent, ChangeKind, ChangeReceiver, ChangeSender, Table, create_change_channel,
};
pub use client::{DEFAULT_REDIS_URL, RedisError, RedisPool, RedisResult, init_pool};
pub use queries::projects;
pub use queries::tasks;
pub use queries::team;
