//! Team member domain models.

use cosmos_redis::team::TeamMemberRow;
use serde::{Deserialize, Serialize};

use crate::error::{CosmosError, CosmosResult};

/// Job label given to members added without one.
pub const DEFAULT_JOB_ROLE: &str = "Member";

/// A person on the team. `role` is a job label, unrelated to session
/// permissions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: String,
    pub name: String,
    pub role: String,
}

impl TeamMember {
    pub fn from_row(row: TeamMemberRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            role: row.role,
        }
    }
}

/// Member form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInput {
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
}

impl MemberInput {
    pub fn new(name: &str, role: &str) -> Self {
        Self {
            name: name.to_string(),
            role: Some(role.to_string()),
        }
    }

    pub fn normalized(self) -> Self {
        let role = self
            .role
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty());
        Self {
            name: self.name.trim().to_string(),
            role,
        }
    }

    pub fn validate(&self) -> CosmosResult<()> {
        if self.name.is_empty() {
            return Err(CosmosError::validation("member name is required"));
        }
        Ok(())
    }

    pub fn role_or_default(&self) -> &str {
        self.role.as_deref().unwrap_or(DEFAULT_JOB_ROLE)
    }
}
