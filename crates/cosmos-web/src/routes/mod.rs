//! Route handlers.

pub mod board;
pub mod projects;
pub mod stats;
pub mod tasks;
pub mod team;
