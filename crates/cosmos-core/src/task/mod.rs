//! Tasks shown on the board.

pub mod model;

pub use model::{Task, TaskInput, TaskStatus};
