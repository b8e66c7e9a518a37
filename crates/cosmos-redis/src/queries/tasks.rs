//! Task queries over Redis hashes.
//!
//! Keys:
//! - `cosmos:task:{id}` hash, field `data` holds the JSON row
//! - `cosmos:tasks:all` sorted set of ids scored by creation time (ms)

use crate::broadcast::{self, ChangeEvent, ChangeKind, Table};
use crate::client::{RedisError, RedisPool, RedisResult};
use crate::queries::{decode_listed, projects};
use chrono::{DateTime, Utc};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

const TASKS_KEY: &str = "cosmos:tasks:all";

fn task_key(id: &str) -> String {
    format!("cosmos:task:{}", id)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRow {
    pub id: String,
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub kanban_status: String,
    pub assignee: Option<String>,
    pub deadline: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub completed_at: Option<String>,
    /// Joined from the owning project at read time, never stored.
    #[serde(default, skip_serializing)]
    pub project_name: Option<String>,
}

/// Writable task fields, as submitted by the task form.
///
/// A missing `kanban_status` means `todo` on insert and "leave as is" on
/// update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub project_id: String,
    pub title: String,
    pub description: Option<String>,
    pub kanban_status: Option<String>,
    pub assignee: Option<String>,
    pub deadline: Option<String>,
}

impl TaskRow {
    /// Build a fresh row stamped at `now`.
    pub fn new(id: &str, draft: &TaskDraft, now: DateTime<Utc>) -> Self {
        let mut row = Self {
            id: id.to_string(),
            project_id: draft.project_id.clone(),
            title: draft.title.clone(),
            description: draft.description.clone(),
            kanban_status: String::new(),
            assignee: draft.assignee.clone(),
            deadline: draft.deadline.clone(),
            created_at: now.to_rfc3339(),
            updated_at: now.to_rfc3339(),
            completed_at: None,
            project_name: None,
        };
        row.set_status(draft.kanban_status.as_deref().unwrap_or("todo"), now);
        row
    }

    /// Overwrite the writable fields, keeping identity and creation time.
    pub fn apply_draft(&mut self, draft: &TaskDraft, now: DateTime<Utc>) {
        self.project_id = draft.project_id.clone();
        self.title = draft.title.clone();
        self.description = draft.description.clone();
        self.assignee = draft.assignee.clone();
        self.deadline = draft.deadline.clone();
        if let Some(status) = &draft.kanban_status {
            self.set_status(status, now);
        }
        self.updated_at = now.to_rfc3339();
    }

    /// Change status and maintain `completed_at`: stamped on entering
    /// `done`, cleared on leaving it.
    pub fn set_status(&mut self, status: &str, now: DateTime<Utc>) {
        let was_done = self.kanban_status == "done";
        self.kanban_status = status.to_string();
        self.updated_at = now.to_rfc3339();
        match (was_done, status == "done") {
            (false, true) => self.completed_at = Some(now.to_rfc3339()),
            (true, false) => self.completed_at = None,
            _ => {}
        }
    }

    fn score(&self) -> i64 {
        DateTime::parse_from_rfc3339(&self.created_at)
            .map(|t| t.timestamp_millis())
            .unwrap_or_default()
    }
}

async fn save_task(pool: &RedisPool, row: &TaskRow) -> RedisResult<()> {
    let mut conn = pool.conn();
    let json = serde_json::to_string(row)?;
    conn.hset::<_, _, _, ()>(task_key(&row.id), "data", &json).await?;
    conn.hset::<_, _, _, ()>(task_key(&row.id), "status", &row.kanban_status).await?;
    conn.zadd::<_, _, _, ()>(TASKS_KEY, &row.id, row.score()).await?;
    Ok(())
}

pub async fn create_task(pool: &RedisPool, id: &str, draft: &TaskDraft) -> RedisResult<TaskRow> {
    let row = TaskRow::new(id, draft, Utc::now());
    save_task(pool, &row).await?;
    broadcast::announce(pool, &ChangeEvent::new(Table::Tasks, ChangeKind::Insert, id)).await;
    Ok(row)
}

pub async fn get_task(pool: &RedisPool, task_id: &str) -> RedisResult<TaskRow> {
    let mut conn = pool.conn();
    let json: Option<String> = conn.hget(task_key(task_id), "data").await?;
    match json {
        Some(j) => Ok(serde_json::from_str(&j)?),
        None => Err(RedisError::NotFound(format!("Task not found: {}", task_id))),
    }
}

/// All tasks, newest first, with the owning project's name joined in.
pub async fn list_tasks(pool: &RedisPool) -> RedisResult<Vec<TaskRow>> {
    let mut conn = pool.conn();
    let ids: Vec<String> = conn.zrevrange(TASKS_KEY, 0, -1).await?;

    let names = projects::project_names(pool).await?;

    let mut tasks = Vec::with_capacity(ids.len());
    for id in ids {
        let json: Option<String> = conn.hget(task_key(&id), "data").await?;
        let Some(j) = json else { continue };
        if let Some(mut row) = decode_listed::<TaskRow>("tasks", &id, &j) {
            row.project_name = names.get(&row.project_id).cloned();
            tasks.push(row);
        }
    }
    Ok(tasks)
}

pub async fn update_task(pool: &RedisPool, task_id: &str, draft: &TaskDraft) -> RedisResult<TaskRow> {
    let mut row = get_task(pool, task_id).await?;
    row.apply_draft(draft, Utc::now());
    save_task(pool, &row).await?;
    broadcast::announce(pool, &ChangeEvent::new(Table::Tasks, ChangeKind::Update, task_id)).await;
    Ok(row)
}

/// Change only the status column of a task.
pub async fn update_task_status(
    pool: &RedisPool,
    task_id: &str,
    new_status: &str,
) -> RedisResult<TaskRow> {
    let mut row = get_task(pool, task_id).await?;
    row.set_status(new_status, Utc::now());
    save_task(pool, &row).await?;
    broadcast::announce(pool, &ChangeEvent::new(Table::Tasks, ChangeKind::Update, task_id)).await;
    Ok(row)
}

pub async fn delete_task(pool: &RedisPool, task_id: &str) -> RedisResult<()> {
    let mut conn = pool.conn();
    let removed: i64 = conn.del(task_key(task_id)).await?;
    conn.zrem::<_, _, ()>(TASKS_KEY, task_id).await?;
    if removed == 0 {
        return Err(RedisError::NotFound(format!("Task not found: {}", task_id)));
    }
    broadcast::announce(pool, &ChangeEvent::new(Table::Tasks, ChangeKind::Delete, task_id)).await;
    Ok(())
}
