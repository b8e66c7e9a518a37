//! Project domain models.

use chrono::{DateTime, NaiveDate, Utc};
use cosmos_redis::projects::ProjectRow;
use serde::{Deserialize, Serialize};

use crate::error::{CosmosError, CosmosResult};
use crate::task::model::blank_to_none;
use crate::time;

/// A tracked project. Tasks point at projects, never the reverse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Project {
    /// Create from database row.
    pub fn from_row(row: ProjectRow) -> CosmosResult<Self> {
        Ok(Self {
            deadline: time::parse_date("deadline", row.deadline.as_deref())?,
            created_at: time::parse_timestamp("created_at", &row.created_at)?,
            id: row.id,
            name: row.name,
            description: row.description,
        })
    }
}

/// Project form input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
}

impl ProjectInput {
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            description: blank_to_none(self.description),
            ..self
        }
    }

    pub fn validate(&self) -> CosmosResult<()> {
        if self.name.is_empty() {
            return Err(CosmosError::validation("project name is required"));
        }
        Ok(())
    }
}
