//! Team members.

pub mod model;

pub use model::{MemberInput, TeamMember};
