//! In-process store.
//!
//! Applies the same row rules as the Redis layer and notifies subscribers
//! over a tokio broadcast channel. Keeps a journal of every accepted
//! mutation and can be switched offline to simulate an unreachable server.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use cosmos_redis::broadcast::receiver_stream;
use cosmos_redis::projects::ProjectRow;
use cosmos_redis::tasks::{TaskDraft, TaskRow};
use cosmos_redis::team::TeamMemberRow;
use cosmos_redis::{ChangeEvent, ChangeKind, ChangeSender, Table, create_change_channel};
use futures::StreamExt;
use uuid::Uuid;

use super::{BackingStore, ChangeStream};
use crate::error::{CosmosError, CosmosResult};

/// A write the store accepted, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    InsertTask { id: String },
    UpdateTask { id: String, draft: TaskDraft },
    UpdateTaskStatus { id: String, status: String },
    DeleteTask { id: String },
    InsertMember { id: String },
    UpdateMember { id: String },
    DeleteMember { id: String },
    InsertProject { id: String },
    DeleteProject { id: String },
}

#[derive(Default)]
struct Tables {
    projects: HashMap<String, ProjectRow>,
    /// Insertion order; fetches return it reversed (newest first).
    tasks: Vec<TaskRow>,
    team: HashMap<String, TeamMemberRow>,
    journal: Vec<Mutation>,
}

/// [`BackingStore`] kept entirely in memory.
pub struct MemoryStore {
    tables: Mutex<Tables>,
    changes: ChangeSender,
    offline: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
            changes: create_change_channel(),
            offline: AtomicBool::new(false),
        }
    }

    /// While offline every call fails as if the server were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Accepted mutations so far.
    pub fn journal(&self) -> Vec<Mutation> {
        self.lock().journal.clone()
    }

    /// Insert a prepared task row as-is (timestamps included) and notify.
    pub fn seed_task(&self, row: TaskRow) {
        let id = row.id.clone();
        self.lock().tasks.push(row);
        self.notify(Table::Tasks, ChangeKind::Insert, &id);
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn check_online(&self) -> CosmosResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(CosmosError::unavailable("connection refused"));
        }
        Ok(())
    }

    fn notify(&self, table: Table, kind: ChangeKind, id: &str) {
        // No subscribers is fine.
        let _ = self.changes.send(ChangeEvent::new(table, kind, id));
    }

    fn with_task<F>(&self, id: &str, mutation: Mutation, apply: F) -> CosmosResult<TaskRow>
    where
        F: FnOnce(&mut TaskRow),
    {
        self.check_online()?;
        let row = {
            let mut tables = self.lock();
            let row = tables
                .tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or_else(|| CosmosError::TaskNotFound(id.to_string()))?;
            apply(row);
            let row = row.clone();
            tables.journal.push(mutation);
            row
        };
        self.notify(Table::Tasks, ChangeKind::Update, id);
        Ok(row)
    }
}

#[async_trait]
impl BackingStore for MemoryStore {
    async fn fetch_projects(&self) -> CosmosResult<Vec<ProjectRow>> {
        self.check_online()?;
        let mut projects: Vec<ProjectRow> = self.lock().projects.values().cloned().collect();
        projects.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(projects)
    }

    async fn fetch_tasks(&self) -> CosmosResult<Vec<TaskRow>> {
        self.check_online()?;
        let tables = self.lock();
        let tasks = tables
            .tasks
            .iter()
            .rev()
            .cloned()
            .map(|mut row| {
                row.project_name = tables.projects.get(&row.project_id).map(|p| p.name.clone());
                row
            })
            .collect();
        Ok(tasks)
    }

    async fn fetch_team(&self) -> CosmosResult<Vec<TeamMemberRow>> {
        self.check_online()?;
        let mut team: Vec<TeamMemberRow> = self.lock().team.values().cloned().collect();
        team.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(team)
    }

    async fn insert_task(&self, draft: &TaskDraft) -> CosmosResult<TaskRow> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        let row = TaskRow::new(&id, draft, Utc::now());
        {
            let mut tables = self.lock();
            tables.tasks.push(row.clone());
            tables.journal.push(Mutation::InsertTask { id: id.clone() });
        }
        self.notify(Table::Tasks, ChangeKind::Insert, &id);
        Ok(row)
    }

    async fn update_task(&self, id: &str, draft: &TaskDraft) -> CosmosResult<TaskRow> {
        let mutation = Mutation::UpdateTask {
            id: id.to_string(),
            draft: draft.clone(),
        };
        self.with_task(id, mutation, |row| row.apply_draft(draft, Utc::now()))
    }

    async fn update_task_status(&self, id: &str, status: &str) -> CosmosResult<TaskRow> {
        let mutation = Mutation::UpdateTaskStatus {
            id: id.to_string(),
            status: status.to_string(),
        };
        self.with_task(id, mutation, |row| row.set_status(status, Utc::now()))
    }

    async fn delete_task(&self, id: &str) -> CosmosResult<()> {
        self.check_online()?;
        {
            let mut tables = self.lock();
            let before = tables.tasks.len();
            tables.tasks.retain(|t| t.id != id);
            if tables.tasks.len() == before {
                return Err(CosmosError::TaskNotFound(id.to_string()));
            }
            tables.journal.push(Mutation::DeleteTask { id: id.to_string() });
        }
        self.notify(Table::Tasks, ChangeKind::Delete, id);
        Ok(())
    }

    async fn insert_member(&self, name: &str, role: &str) -> CosmosResult<TeamMemberRow> {
        self.check_online()?;
        let row = TeamMemberRow {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            role: role.to_string(),
        };
        {
            let mut tables = self.lock();
            tables.team.insert(row.id.clone(), row.clone());
            tables.journal.push(Mutation::InsertMember { id: row.id.clone() });
        }
        self.notify(Table::Team, ChangeKind::Insert, &row.id);
        Ok(row)
    }

    async fn update_member(&self, id: &str, name: &str, role: &str) -> CosmosResult<TeamMemberRow> {
        self.check_online()?;
        let row = {
            let mut tables = self.lock();
            let row = tables
                .team
                .get_mut(id)
                .ok_or_else(|| CosmosError::MemberNotFound(id.to_string()))?;
            row.name = name.to_string();
            row.role = role.to_string();
            let row = row.clone();
            tables.journal.push(Mutation::UpdateMember { id: id.to_string() });
            row
        };
        self.notify(Table::Team, ChangeKind::Update, id);
        Ok(row)
    }

    async fn delete_member(&self, id: &str) -> CosmosResult<()> {
        self.check_online()?;
        {
            let mut tables = self.lock();
            if tables.team.remove(id).is_none() {
                return Err(CosmosError::MemberNotFound(id.to_string()));
            }
            tables.journal.push(Mutation::DeleteMember { id: id.to_string() });
        }
        self.notify(Table::Team, ChangeKind::Delete, id);
        Ok(())
    }

    async fn insert_project(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: Option<&str>,
    ) -> CosmosResult<ProjectRow> {
        self.check_online()?;
        let id = Uuid::new_v4().to_string();
        let row = ProjectRow::new(&id, name, description, deadline);
        {
            let mut tables = self.lock();
            tables.projects.insert(id.clone(), row.clone());
            tables.journal.push(Mutation::InsertProject { id: id.clone() });
        }
        self.notify(Table::Projects, ChangeKind::Insert, &id);
        Ok(row)
    }

    async fn delete_project(&self, id: &str) -> CosmosResult<()> {
        self.check_online()?;
        {
            let mut tables = self.lock();
            if tables.projects.remove(id).is_none() {
                return Err(CosmosError::ProjectNotFound(id.to_string()));
            }
            tables.journal.push(Mutation::DeleteProject { id: id.to_string() });
        }
        self.notify(Table::Projects, ChangeKind::Delete, id);
        Ok(())
    }

    async fn subscribe(&self, table: Table) -> CosmosResult<ChangeStream> {
        self.check_online()?;
        Ok(receiver_stream(self.changes.subscribe(), table).boxed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(project_id: &str, title: &str) -> TaskDraft {
        TaskDraft {
            project_id: project_id.to_string(),
            title: title.to_string(),
            description: None,
            kanban_status: Some("todo".to_string()),
            assignee: None,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_tasks_newest_first_with_project_name() {
        let store = MemoryStore::new();
        let project = store.insert_project("Website", None, None).await.unwrap();
        store.insert_task(&draft(&project.id, "first")).await.unwrap();
        store.insert_task(&draft("gone", "second")).await.unwrap();

        let tasks = store.fetch_tasks().await.unwrap();
        assert_eq!(tasks[0].title, "second");
        assert_eq!(tasks[0].project_name, None);
        assert_eq!(tasks[1].project_name.as_deref(), Some("Website"));
    }

    #[tokio::test]
    async fn test_delete_project_keeps_tasks() {
        let store = MemoryStore::new();
        let project = store.insert_project("Website", None, None).await.unwrap();
        store.insert_task(&draft(&project.id, "orphan-to-be")).await.unwrap();

        store.delete_project(&project.id).await.unwrap();
        let tasks = store.fetch_tasks().await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].project_name, None);
    }

    #[tokio::test]
    async fn test_subscription_sees_every_kind() {
        let store = MemoryStore::new();
        let mut feed = store.subscribe(Table::Team).await.unwrap();

        let member = store.insert_member("Ayu", "DevOps").await.unwrap();
        store.update_member(&member.id, "Ayu P.", "DevOps").await.unwrap();
        store.delete_member(&member.id).await.unwrap();

        let kinds: Vec<ChangeKind> = vec![
            feed.next().await.unwrap().kind,
            feed.next().await.unwrap().kind,
            feed.next().await.unwrap().kind,
        ];
        assert_eq!(kinds, vec![ChangeKind::Insert, ChangeKind::Update, ChangeKind::Delete]);
    }

    #[tokio::test]
    async fn test_offline_rejects_calls() {
        let store = MemoryStore::new();
        store.set_offline(true);
        assert!(matches!(store.fetch_team().await, Err(CosmosError::Unavailable(_))));
        assert!(store.insert_member("Ayu", "DevOps").await.is_err());
        assert!(store.journal().is_empty());
    }

    #[tokio::test]
    async fn test_missing_rows_are_typed() {
        let store = MemoryStore::new();
        assert!(matches!(
            store.update_task_status("nope", "done").await,
            Err(CosmosError::TaskNotFound(_))
        ));
        assert!(matches!(store.delete_member("nope").await, Err(CosmosError::MemberNotFound(_))));
    }
}
