//! The only write path to the backing store.
//!
//! Every operation checks the session role, then validates its input, and
//! only then calls the store. After a successful write the gateway always
//! refreshes the cache itself; the change feed may refresh again, which is
//! harmless. Failures are returned, never retried.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::cache::EntityCache;
use crate::error::{CosmosError, CosmosResult, ErrorKind};
use crate::project::{Project, ProjectInput};
use crate::session::{Action, SessionRole};
use crate::store::BackingStore;
use crate::task::{Task, TaskInput, TaskStatus};
use crate::team::{MemberInput, TeamMember};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// A short message for the end user about an operation's outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice for a finished operation.
    pub fn from_result<T>(result: &CosmosResult<T>, success: impl Into<String>) -> Self {
        match result {
            Ok(_) => Self::success(success),
            Err(e) => Self::from(e),
        }
    }
}

impl From<&CosmosError> for Notice {
    fn from(err: &CosmosError) -> Self {
        match err.kind() {
            ErrorKind::Permission => Self::error(format!("You do not have permission: {}", err)),
            ErrorKind::Validation => Self::error(err.to_string()),
            ErrorKind::Store => Self::error(format!("Could not save changes: {}", err)),
        }
    }
}

/// Role-gated mutation entry points for one session.
#[derive(Clone)]
pub struct MutationGateway {
    store: Arc<dyn BackingStore>,
    cache: Arc<EntityCache>,
    role: SessionRole,
}

impl MutationGateway {
    pub fn new(store: Arc<dyn BackingStore>, cache: Arc<EntityCache>, role: SessionRole) -> Self {
        Self { store, cache, role }
    }

    pub fn role(&self) -> SessionRole {
        self.role
    }

    fn authorize(&self, action: Action) -> CosmosResult<()> {
        self.role.authorize(action).inspect_err(|e| {
            debug!(role = %self.role, error = %e, "Mutation rejected");
        })
    }

    /// Bring the cache up to date after a write. A failed refresh is already
    /// logged by the cache and does not undo the write.
    async fn settle(&self) {
        if let Err(e) = self.cache.refresh().await {
            debug!(error = %e, "Post-write refresh failed");
        }
    }

    fn store_failed(&self, op: &'static str, err: CosmosError) -> CosmosError {
        warn!(op, role = %self.role, error = %err, "Backing store write failed");
        err
    }

    pub async fn create_task(&self, input: TaskInput) -> CosmosResult<Task> {
        self.authorize(Action::CreateTask)?;
        let input = input.normalized();
        input.validate()?;

        let row = self
            .store
            .insert_task(&input.to_draft())
            .await
            .map_err(|e| self.store_failed("create_task", e))?;
        info!(task_id = %row.id, project_id = %row.project_id, "Task created");
        self.settle().await;
        Task::from_row(row)
    }

    pub async fn update_task(&self, id: &str, input: TaskInput) -> CosmosResult<Task> {
        self.authorize(Action::UpdateTask)?;
        let input = input.normalized();
        input.validate()?;

        let row = self
            .store
            .update_task(id, &input.to_draft())
            .await
            .map_err(|e| self.store_failed("update_task", e))?;
        info!(task_id = %id, "Task updated");
        self.settle().await;
        Task::from_row(row)
    }

    /// Move a task to another column. Only the status changes.
    pub async fn update_task_status(&self, id: &str, status: TaskStatus) -> CosmosResult<Task> {
        self.authorize(Action::UpdateTaskStatus)?;
        if id.trim().is_empty() {
            return Err(CosmosError::validation("task id is required"));
        }

        let row = self
            .store
            .update_task_status(id, status.as_str())
            .await
            .map_err(|e| self.store_failed("update_task_status", e))?;
        info!(task_id = %id, status = %status, "Task status updated");
        self.settle().await;
        Task::from_row(row)
    }

    pub async fn delete_task(&self, id: &str) -> CosmosResult<()> {
        self.authorize(Action::DeleteTask)?;
        self.store
            .delete_task(id)
            .await
            .map_err(|e| self.store_failed("delete_task", e))?;
        info!(task_id = %id, "Task deleted");
        self.settle().await;
        Ok(())
    }

    pub async fn create_team_member(&self, input: MemberInput) -> CosmosResult<TeamMember> {
        self.authorize(Action::CreateMember)?;
        let input = input.normalized();
        input.validate()?;

        let row = self
            .store
            .insert_member(&input.name, input.role_or_default())
            .await
            .map_err(|e| self.store_failed("create_team_member", e))?;
        info!(member_id = %row.id, "Team member added");
        self.settle().await;
        Ok(TeamMember::from_row(row))
    }

    pub async fn update_team_member(&self, id: &str, input: MemberInput) -> CosmosResult<TeamMember> {
        self.authorize(Action::UpdateMember)?;
        let input = input.normalized();
        input.validate()?;

        let row = self
            .store
            .update_member(id, &input.name, input.role_or_default())
            .await
            .map_err(|e| self.store_failed("update_team_member", e))?;
        info!(member_id = %id, "Team member updated");
        self.settle().await;
        Ok(TeamMember::from_row(row))
    }

    pub async fn delete_team_member(&self, id: &str) -> CosmosResult<()> {
        self.authorize(Action::DeleteMember)?;
        self.store
            .delete_member(id)
            .await
            .map_err(|e| self.store_failed("delete_team_member", e))?;
        info!(member_id = %id, "Team member removed");
        self.settle().await;
        Ok(())
    }

    pub async fn create_project(&self, input: ProjectInput) -> CosmosResult<Project> {
        self.authorize(Action::CreateProject)?;
        let input = input.normalized();
        input.validate()?;

        let deadline = input.deadline.map(|d| d.format("%Y-%m-%d").to_string());
        let row = self
            .store
            .insert_project(&input.name, input.description.as_deref(), deadline.as_deref())
            .await
            .map_err(|e| self.store_failed("create_project", e))?;
        info!(project_id = %row.id, "Project created");
        self.settle().await;
        Project::from_row(row)
    }

    /// Delete a project. Its tasks are not touched and render as orphans.
    pub async fn delete_project(&self, id: &str) -> CosmosResult<()> {
        self.authorize(Action::DeleteProject)?;
        self.store
            .delete_project(id)
            .await
            .map_err(|e| self.store_failed("delete_project", e))?;
        info!(project_id = %id, "Project deleted");
        self.settle().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, Mutation};

    async fn setup(role: SessionRole) -> (Arc<MemoryStore>, Arc<EntityCache>, MutationGateway, String) {
        let store = Arc::new(MemoryStore::new());
        let project = store.insert_project("Website", None, None).await.unwrap();
        store.insert_member("Rina", "Frontend Dev").await.unwrap();
        let cache = Arc::new(EntityCache::new(store.clone()));
        cache.refresh().await.unwrap();
        let gateway = MutationGateway::new(store.clone(), cache.clone(), role);
        (store, cache, gateway, project.id)
    }

    #[tokio::test]
    async fn test_viewer_rejected_without_touching_store_or_cache() {
        let (store, cache, gateway, project_id) = setup(SessionRole::Viewer).await;
        let admin = MutationGateway::new(store.clone(), cache.clone(), SessionRole::Admin);
        let task = admin.create_task(TaskInput::new(&project_id, "Existing")).await.unwrap();
        let member_id = cache.team()[0].id.clone();
        let journal_before = store.journal();
        let snapshot_before = cache.snapshot();

        let results: Vec<CosmosError> = vec![
            gateway.create_task(TaskInput::new(&project_id, "New")).await.unwrap_err(),
            gateway.update_task(&task.id, TaskInput::new(&project_id, "Edit")).await.unwrap_err(),
            gateway.update_task_status(&task.id, TaskStatus::Done).await.unwrap_err(),
            gateway.delete_task(&task.id).await.unwrap_err(),
            gateway.create_team_member(MemberInput::new("Budi", "DevOps")).await.unwrap_err(),
            gateway.update_team_member(&member_id, MemberInput::new("Budi", "DevOps")).await.unwrap_err(),
            gateway.delete_team_member(&member_id).await.unwrap_err(),
        ];

        for err in &results {
            assert_eq!(err.kind(), ErrorKind::Permission, "{}", err);
        }
        assert_eq!(store.journal(), journal_before);
        assert!(Arc::ptr_eq(&snapshot_before, &cache.snapshot()));
    }

    #[tokio::test]
    async fn test_member_can_create_tasks() {
        let (_store, cache, gateway, project_id) = setup(SessionRole::Member).await;
        let task = gateway.create_task(TaskInput::new(&project_id, "Login page")).await.unwrap();
        assert_eq!(task.status, TaskStatus::Todo);
        assert!(cache.snapshot().task(&task.id).is_some());
    }

    #[tokio::test]
    async fn test_member_cannot_create_projects() {
        let (store, _cache, gateway, _) = setup(SessionRole::Member).await;
        let input = ProjectInput {
            name: "Mobile".to_string(),
            description: None,
            deadline: None,
        };
        let err = gateway.create_project(input).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Permission);
        assert_eq!(store.journal().len(), 2);
    }

    #[tokio::test]
    async fn test_validation_happens_before_dispatch() {
        let (store, _cache, gateway, project_id) = setup(SessionRole::Admin).await;
        let before = store.journal().len();

        let err = gateway.create_task(TaskInput::new(&project_id, "   ")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = gateway.create_task(TaskInput::new("", "Title")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
        let err = gateway.create_team_member(MemberInput::new("  ", "DevOps")).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);

        assert_eq!(store.journal().len(), before);
    }

    #[tokio::test]
    async fn test_success_refreshes_cache() {
        let (_store, cache, gateway, project_id) = setup(SessionRole::Admin).await;
        let revision = cache.snapshot().revision;

        let member = gateway
            .create_team_member(MemberInput { name: " Budi ".to_string(), role: None })
            .await
            .unwrap();
        assert_eq!(member.name, "Budi");
        assert_eq!(member.role, "Member");
        assert!(cache.snapshot().revision > revision);
        assert_eq!(cache.team().len(), 2);

        let task = gateway.create_task(TaskInput::new(&project_id, "Docs")).await.unwrap();
        gateway.delete_task(&task.id).await.unwrap();
        assert!(cache.snapshot().task(&task.id).is_none());
    }

    #[tokio::test]
    async fn test_status_update_touches_only_status() {
        let (store, cache, gateway, project_id) = setup(SessionRole::Member).await;
        let mut input = TaskInput::new(&project_id, "Release");
        input.assignee = Some("Rina".to_string());
        let task = gateway.create_task(input).await.unwrap();

        let moved = gateway.update_task_status(&task.id, TaskStatus::Done).await.unwrap();
        assert_eq!(moved.status, TaskStatus::Done);
        assert_eq!(moved.title, task.title);
        assert_eq!(moved.assignee, task.assignee);
        assert!(moved.completed_at.is_some());
        assert_eq!(
            store.journal().last(),
            Some(&Mutation::UpdateTaskStatus { id: task.id.clone(), status: "done".to_string() })
        );
        assert_eq!(cache.snapshot().task(&task.id).unwrap().status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn test_edit_without_status_keeps_done_task_done() {
        let (_store, cache, gateway, project_id) = setup(SessionRole::Admin).await;
        let task = gateway.create_task(TaskInput::new(&project_id, "Ship")).await.unwrap();
        let done = gateway.update_task_status(&task.id, TaskStatus::Done).await.unwrap();
        let completed_at = done.completed_at;
        assert!(completed_at.is_some());

        let edit: TaskInput = serde_json::from_value(serde_json::json!({
            "title": "Ship v2",
            "project_id": project_id,
        }))
        .unwrap();
        assert_eq!(edit.status, None);
        let edited = gateway.update_task(&task.id, edit).await.unwrap();

        assert_eq!(edited.title, "Ship v2");
        assert_eq!(edited.status, TaskStatus::Done);
        assert_eq!(edited.completed_at, completed_at);
        let cached = cache.snapshot().task(&task.id).cloned().unwrap();
        assert_eq!(cached.status, TaskStatus::Done);
        assert_eq!(cached.completed_at, completed_at);
    }

    #[tokio::test]
    async fn test_edit_with_status_moves_task() {
        let (_store, _cache, gateway, project_id) = setup(SessionRole::Member).await;
        let task = gateway.create_task(TaskInput::new(&project_id, "Ship")).await.unwrap();
        gateway.update_task_status(&task.id, TaskStatus::Done).await.unwrap();

        let mut edit = TaskInput::new(&project_id, "Ship again");
        edit.status = Some(TaskStatus::Todo);
        let reopened = gateway.update_task(&task.id, edit).await.unwrap();
        assert_eq!(reopened.status, TaskStatus::Todo);
        assert!(reopened.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_is_returned_and_cache_kept() {
        let (store, cache, gateway, project_id) = setup(SessionRole::Admin).await;
        let before = cache.snapshot();
        store.set_offline(true);

        let result = gateway.create_task(TaskInput::new(&project_id, "Offline")).await;
        let err = result.as_ref().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Store);
        assert!(Arc::ptr_eq(&before, &cache.snapshot()));

        let notice = Notice::from_result(&result, "Task added");
        assert_eq!(notice.level, NoticeLevel::Error);
        assert!(notice.message.starts_with("Could not save changes"));
    }

    #[tokio::test]
    async fn test_missing_task_is_a_store_error() {
        let (_store, _cache, gateway, _) = setup(SessionRole::Admin).await;
        let err = gateway.update_task_status("missing", TaskStatus::Todo).await.unwrap_err();
        assert!(matches!(err, CosmosError::TaskNotFound(_)));
    }
}
