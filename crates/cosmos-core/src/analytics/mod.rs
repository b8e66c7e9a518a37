//! Read-only aggregates over a snapshot.
//!
//! Nothing here is cached: views recompute on every render. All time-based
//! figures take the evaluation instant explicitly.
//!
//! Completion instant is always [`Task::completion_instant`]
//! (`completed_at`, falling back to `updated_at`), for the on-time rate,
//! the cycle time and the weekly throughput alike.

pub mod model;

pub use model::{DashboardStats, GlobalCounts, ProjectTally, StatusTab};

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};

use crate::task::{Task, TaskStatus};
use crate::time::deadline_instant;

/// Length of the throughput window.
pub const THROUGHPUT_WINDOW_DAYS: i64 = 7;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Tally tasks per referenced project, in order of first appearance.
pub fn project_tallies(tasks: &[Task]) -> Vec<ProjectTally> {
    let mut tallies: Vec<ProjectTally> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for task in tasks {
        let slot = *index.entry(task.project_id.as_str()).or_insert_with(|| {
            tallies.push(ProjectTally {
                project_id: task.project_id.clone(),
                name: task.project_label(),
                todo: 0,
                inprogress: 0,
                done: 0,
                total: 0,
            });
            tallies.len() - 1
        });

        let tally = &mut tallies[slot];
        match task.status {
            TaskStatus::Todo => tally.todo += 1,
            TaskStatus::InProgress => tally.inprogress += 1,
            TaskStatus::Done => tally.done += 1,
        }
        tally.total = tally.todo + tally.inprogress + tally.done;
    }

    tallies
}

pub fn global_counts(tasks: &[Task]) -> GlobalCounts {
    tasks.iter().fold(GlobalCounts::default(), |mut counts, task| {
        counts.total += 1;
        match task.status {
            TaskStatus::Todo => counts.todo += 1,
            TaskStatus::InProgress => counts.inprogress += 1,
            TaskStatus::Done => counts.done += 1,
        }
        counts
    })
}

fn done_tasks(tasks: &[Task]) -> impl Iterator<Item = &Task> {
    tasks.iter().filter(|t| t.is_done())
}

/// Rounded percentage of done tasks completed no later than their deadline.
/// Done tasks without a deadline count as on time. 0 with no done tasks.
pub fn on_time_rate(tasks: &[Task]) -> u32 {
    let mut done = 0;
    let mut on_time = 0;
    for task in done_tasks(tasks) {
        done += 1;
        let in_time = match task.deadline {
            None => true,
            Some(deadline) => task.completion_instant() <= deadline_instant(deadline),
        };
        if in_time {
            on_time += 1;
        }
    }
    model::percent(on_time, done)
}

/// Mean completion time of done tasks in days, formatted to one decimal
/// place; `"0.0"` with no done tasks.
pub fn average_cycle_days(tasks: &[Task]) -> String {
    let (count, total_ms) = done_tasks(tasks).fold((0u32, 0i64), |(n, sum), task| {
        let elapsed = task.completion_instant() - task.created_at;
        (n + 1, sum + elapsed.num_milliseconds())
    });
    if count == 0 {
        return "0.0".to_string();
    }
    format!("{:.1}", total_ms as f64 / f64::from(count) / MILLIS_PER_DAY)
}

/// Done tasks whose completion instant is strictly after `now - 7 days`.
pub fn weekly_throughput(tasks: &[Task], now: DateTime<Utc>) -> usize {
    let window_start = now - Duration::days(THROUGHPUT_WINDOW_DAYS);
    done_tasks(tasks)
        .filter(|t| t.completion_instant() > window_start)
        .count()
}

pub fn dashboard_stats(tasks: &[Task], now: DateTime<Utc>) -> DashboardStats {
    DashboardStats {
        counts: global_counts(tasks),
        on_time_rate: on_time_rate(tasks),
        average_cycle_days: average_cycle_days(tasks),
        weekly_throughput: weekly_throughput(tasks, now),
    }
}

/// Apply the search box and status tab to project tallies. The search is a
/// case-insensitive substring match on the project name.
pub fn filter_projects(tallies: &[ProjectTally], search: &str, tab: StatusTab) -> Vec<ProjectTally> {
    let needle = search.trim().to_lowercase();
    tallies
        .iter()
        .filter(|t| tab.matches(t))
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .cloned()
        .collect()
}
