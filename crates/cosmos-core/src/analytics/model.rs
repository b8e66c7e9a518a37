//! Aggregate read models.

use serde::{Deserialize, Serialize};

use crate::error::CosmosError;

/// Per-project status counts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectTally {
    pub project_id: String,
    pub name: String,
    pub todo: usize,
    pub inprogress: usize,
    pub done: usize,
    pub total: usize,
}

impl ProjectTally {
    /// Share of done tasks as a rounded percentage; 0 for an empty project.
    pub fn completion_percent(&self) -> u32 {
        percent(self.done, self.total)
    }
}

/// Counts across every task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCounts {
    pub total: usize,
    pub todo: usize,
    pub inprogress: usize,
    pub done: usize,
}

/// Everything the dashboard header shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub counts: GlobalCounts,
    /// Rounded percentage of done tasks finished by their deadline.
    pub on_time_rate: u32,
    /// Mean days from creation to completion, one decimal place.
    pub average_cycle_days: String,
    /// Tasks completed in the trailing seven days.
    pub weekly_throughput: usize,
}

/// Status tab on the project list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusTab {
    #[default]
    All,
    /// Projects with at least one todo task.
    Todo,
    /// Projects with at least one in-progress task.
    InProgress,
    /// Projects whose tasks are all done.
    Done,
}

impl StatusTab {
    pub fn matches(&self, tally: &ProjectTally) -> bool {
        match self {
            Self::All => true,
            Self::Todo => tally.todo > 0,
            Self::InProgress => tally.inprogress > 0,
            Self::Done => tally.total > 0 && tally.done == tally.total,
        }
    }
}

impl std::str::FromStr for StatusTab {
    type Err = CosmosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(Self::All),
            "todo" => Ok(Self::Todo),
            "inprogress" => Ok(Self::InProgress),
            "done" => Ok(Self::Done),
            other => Err(CosmosError::validation(format!("unknown status tab '{}'", other))),
        }
    }
}

pub(crate) fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}
