//! Task domain models.

use chrono::{DateTime, NaiveDate, Utc};
use cosmos_redis::tasks::{TaskDraft, TaskRow};
use serde::{Deserialize, Serialize};

use crate::error::{CosmosError, CosmosResult};
use crate::time;

/// A task on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub project_id: String,
    /// Name of the owning project, if it still exists.
    pub project_name: Option<String>,
    /// Free-text name; not linked to a team member record.
    pub assignee: Option<String>,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a Task from a database row.
    pub fn from_row(row: TaskRow) -> CosmosResult<Self> {
        Ok(Self {
            status: row.kanban_status.parse()?,
            deadline: time::parse_date("deadline", row.deadline.as_deref())?,
            created_at: time::parse_timestamp("created_at", &row.created_at)?,
            updated_at: time::parse_timestamp("updated_at", &row.updated_at)?,
            completed_at: time::parse_optional_timestamp("completed_at", row.completed_at.as_deref())?,
            id: row.id,
            title: row.title,
            description: row.description,
            project_id: row.project_id,
            project_name: row.project_name,
            assignee: row.assignee,
        })
    }

    /// When the task was finished: `completed_at` if the store recorded it,
    /// otherwise the last update.
    pub fn completion_instant(&self) -> DateTime<Utc> {
        self.completed_at.unwrap_or(self.updated_at)
    }

    /// Project name for display, with a placeholder for orphaned tasks.
    pub fn project_label(&self) -> String {
        match &self.project_name {
            Some(name) => name.clone(),
            None => {
                let short: String = self.project_id.chars().take(8).collect();
                format!("Project {}", short)
            }
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == TaskStatus::Done
    }
}

/// Task status (board column).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
}

impl TaskStatus {
    /// Columns in board order.
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    /// Convert to the stored string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "inprogress",
            Self::Done => "done",
        }
    }

    /// Column heading.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Done",
        }
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = CosmosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            _ => Err(CosmosError::InvalidStatus(s.to_string())),
        }
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Task form input for create and update.
///
/// `status` is optional: a new task without one starts in `todo`, an
/// edit without one keeps the stored status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskInput {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assignee: Option<String>,
    #[serde(default)]
    pub deadline: Option<NaiveDate>,
    pub project_id: String,
    #[serde(default)]
    pub status: Option<TaskStatus>,
}

impl TaskInput {
    pub fn new(project_id: &str, title: &str) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            assignee: None,
            deadline: None,
            project_id: project_id.to_string(),
            status: None,
        }
    }

    /// Trim text fields and turn blank optionals into `None`.
    pub fn normalized(self) -> Self {
        Self {
            title: self.title.trim().to_string(),
            description: blank_to_none(self.description),
            assignee: blank_to_none(self.assignee),
            project_id: self.project_id.trim().to_string(),
            ..self
        }
    }

    /// Check required fields. Expects normalized input.
    pub fn validate(&self) -> CosmosResult<()> {
        if self.title.is_empty() {
            return Err(CosmosError::validation("task title is required"));
        }
        if self.project_id.is_empty() {
            return Err(CosmosError::validation("a project must be selected"));
        }
        Ok(())
    }

    pub fn to_draft(&self) -> TaskDraft {
        TaskDraft {
            project_id: self.project_id.clone(),
            title: self.title.clone(),
            description: self.description.clone(),
            kanban_status: self.status.map(|s| s.as_str().to_string()),
            assignee: self.assignee.clone(),
            deadline: self.deadline.map(|d| d.format("%Y-%m-%d").to_string()),
        }
    }
}

pub(crate) fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(status: &str) -> TaskRow {
        TaskRow {
            id: "3f9a2c1e-77aa".to_string(),
            project_id: "8c1d5b20-0f3e-4d0b".to_string(),
            title: "Ship release".to_string(),
            description: None,
            kanban_status: status.to_string(),
            assignee: None,
            deadline: Some("2026-10-20".to_string()),
            created_at: "2026-10-01T09:00:00Z".to_string(),
            updated_at: "2026-10-05T09:00:00Z".to_string(),
            completed_at: None,
            project_name: None,
        }
    }

    #[test]
    fn test_status_strings() {
        for status in TaskStatus::ALL {
            assert_eq!(status.as_str().parse::<TaskStatus>().unwrap(), status);
        }
        assert!("in_progress".parse::<TaskStatus>().is_err());
        assert!("backlog".parse::<TaskStatus>().is_err());
    }

    #[test]
    fn test_from_row_rejects_unknown_status() {
        let err = Task::from_row(row("review")).unwrap_err();
        assert!(matches!(err, CosmosError::InvalidStatus(_)));
    }

    #[test]
    fn test_completion_instant_prefers_completed_at() {
        let mut r = row("done");
        let task = Task::from_row(r.clone()).unwrap();
        assert_eq!(task.completion_instant(), task.updated_at);

        r.completed_at = Some("2026-10-03T12:00:00Z".to_string());
        let task = Task::from_row(r).unwrap();
        assert_eq!(task.completion_instant().to_rfc3339(), "2026-10-03T12:00:00+00:00");
    }

    #[test]
    fn test_orphaned_project_label() {
        let task = Task::from_row(row("todo")).unwrap();
        assert_eq!(task.project_label(), "Project 8c1d5b20");

        let mut r = row("todo");
        r.project_name = Some("Website".to_string());
        assert_eq!(Task::from_row(r).unwrap().project_label(), "Website");
    }

    #[test]
    fn test_input_normalization_and_validation() {
        let mut input = TaskInput::new(" p-1 ", "  Write docs ");
        input.description = Some("   ".to_string());
        input.assignee = Some(" Dewi ".to_string());
        let input = input.normalized();
        assert_eq!(input.title, "Write docs");
        assert_eq!(input.project_id, "p-1");
        assert_eq!(input.description, None);
        assert_eq!(input.assignee.as_deref(), Some("Dewi"));
        assert!(input.validate().is_ok());

        assert!(TaskInput::new("p-1", "   ").normalized().validate().is_err());
        assert!(TaskInput::new("", "Title").normalized().validate().is_err());
    }
}
