//! The backing-store seam.
//!
//! Everything the engine knows about the outside world goes through
//! [`BackingStore`]: row fetches per table, row mutations, and one change
//! subscription per table.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use cosmos_redis::projects::ProjectRow;
use cosmos_redis::tasks::{TaskDraft, TaskRow};
use cosmos_redis::team::TeamMemberRow;
use cosmos_redis::{ChangeEvent, Table};
use futures::stream::BoxStream;

use crate::error::CosmosResult;

pub use self::memory::{MemoryStore, Mutation};
pub use self::redis::RedisStore;
pub use cosmos_redis::DEFAULT_REDIS_URL;

/// Live change notifications for one table. Dropping it releases the
/// subscription.
pub type ChangeStream = BoxStream<'static, ChangeEvent>;

/// Remote relational store holding projects, tasks and team members.
#[async_trait]
pub trait BackingStore: Send + Sync {
    /// All projects, ordered by name.
    async fn fetch_projects(&self) -> CosmosResult<Vec<ProjectRow>>;

    /// All tasks, newest first, with `project_name` joined in.
    async fn fetch_tasks(&self) -> CosmosResult<Vec<TaskRow>>;

    /// All team members, ordered by name.
    async fn fetch_team(&self) -> CosmosResult<Vec<TeamMemberRow>>;

    async fn insert_task(&self, draft: &TaskDraft) -> CosmosResult<TaskRow>;

    async fn update_task(&self, id: &str, draft: &TaskDraft) -> CosmosResult<TaskRow>;

    /// Change only the status column.
    async fn update_task_status(&self, id: &str, status: &str) -> CosmosResult<TaskRow>;

    async fn delete_task(&self, id: &str) -> CosmosResult<()>;

    async fn insert_member(&self, name: &str, role: &str) -> CosmosResult<TeamMemberRow>;

    async fn update_member(&self, id: &str, name: &str, role: &str) -> CosmosResult<TeamMemberRow>;

    async fn delete_member(&self, id: &str) -> CosmosResult<()>;

    async fn insert_project(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: Option<&str>,
    ) -> CosmosResult<ProjectRow>;

    /// Delete a project; its tasks stay.
    async fn delete_project(&self, id: &str) -> CosmosResult<()>;

    /// Subscribe to every insert, update and delete on `table`.
    async fn subscribe(&self, table: Table) -> CosmosResult<ChangeStream>;
}
