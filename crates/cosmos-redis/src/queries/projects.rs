//! Project queries over Redis hashes.

use crate::broadcast::{self, ChangeEvent, ChangeKind, Table};
use crate::client::{RedisError, RedisPool, RedisResult};
use crate::queries::decode_listed;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const PROJECTS_KEY: &str = "cosmos:projects:all";

fn project_key(id: &str) -> String {
    format!("cosmos:project:{}", id)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub deadline: Option<String>,
    pub created_at: String,
}

impl ProjectRow {
    pub fn new(id: &str, name: &str, description: Option<&str>, deadline: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            deadline: deadline.map(str::to_string),
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

pub async fn create_project(
    pool: &RedisPool,
    id: &str,
    name: &str,
    description: Option<&str>,
    deadline: Option<&str>,
) -> RedisResult<ProjectRow> {
    let mut conn = pool.conn();
    let row = ProjectRow::new(id, name, description, deadline);
    let json = serde_json::to_string(&row)?;
    conn.hset::<_, _, _, ()>(project_key(id), "data", &json).await?;
    conn.hset::<_, _, _, ()>(project_key(id), "name", name).await?;
    conn.sadd::<_, _, ()>(PROJECTS_KEY, id).await?;
    broadcast::announce(pool, &ChangeEvent::new(Table::Projects, ChangeKind::Insert, id)).await;
    Ok(row)
}

/// All projects ordered by name.
pub async fn list_projects(pool: &RedisPool) -> RedisResult<Vec<ProjectRow>> {
    let mut conn = pool.conn();
    let ids: Vec<String> = conn.smembers(PROJECTS_KEY).await?;
    let mut projects = Vec::with_capacity(ids.len());
    for id in ids {
        let json: Option<String> = conn.hget(project_key(&id), "data").await?;
        let Some(j) = json else { continue };
        if let Some(row) = decode_listed::<ProjectRow>("projects", &id, &j) {
            projects.push(row);
        }
    }
    projects.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(projects)
}

/// Project id → name, for joining onto task rows.
pub async fn project_names(pool: &RedisPool) -> RedisResult<HashMap<String, String>> {
    let mut conn = pool.conn();
    let ids: Vec<String> = conn.smembers(PROJECTS_KEY).await?;
    let mut names = HashMap::with_capacity(ids.len());
    for id in ids {
        let name: Option<String> = conn.hget(project_key(&id), "name").await?;
        if let Some(name) = name {
            names.insert(id, name);
        }
    }
    Ok(names)
}

/// Delete a project. Its tasks are left in place.
pub async fn delete_project(pool: &RedisPool, project_id: &str) -> RedisResult<()> {
    let mut conn = pool.conn();
    let removed: i64 = conn.del(project_key(project_id)).await?;
    conn.srem::<_, _, ()>(PROJECTS_KEY, project_id).await?;
    if removed == 0 {
        return Err(RedisError::NotFound(format!("Project not found: {}", project_id)));
    }
    broadcast::announce(pool, &ChangeEvent::new(Table::Projects, ChangeKind::Delete, project_id)).await;
    Ok(())
}
