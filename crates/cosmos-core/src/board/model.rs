//! Board view models.

use serde::{Deserialize, Serialize};

use crate::gateway::Notice;
use crate::task::{Task, TaskStatus};

/// The three-column board of one project, or of all of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Board {
    /// `None` on the all-projects board.
    pub project_id: Option<String>,
    pub columns: Vec<BoardColumn>,
}

impl Board {
    pub fn column(&self, status: TaskStatus) -> Option<&BoardColumn> {
        self.columns.iter().find(|c| c.status == status)
    }

    pub fn is_global(&self) -> bool {
        self.project_id.is_none()
    }

    pub fn total_tasks(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// A column on the board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardColumn {
    pub status: TaskStatus,
    pub title: String,
    pub tasks: Vec<Task>,
}

/// Why a drop did nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Released outside any column.
    NoTarget,
    /// The session may not move cards.
    ReadOnly,
    /// The card is not on this board.
    UnknownTask,
    /// Dropped back into its own column.
    SameColumn,
}

/// Result of releasing a card.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DropOutcome {
    Ignored { reason: IgnoreReason },
    Moved { task: Task },
    /// The write failed and the card went back to its column.
    Reverted { notice: Notice },
}
