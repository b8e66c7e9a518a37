//! Projects.

pub mod model;

pub use model::{Project, ProjectInput};
