//! Production store over the Redis row layer.

use async_trait::async_trait;
use cosmos_redis::projects::{self, ProjectRow};
use cosmos_redis::tasks::{self, TaskDraft, TaskRow};
use cosmos_redis::team::{self, TeamMemberRow};
use cosmos_redis::{RedisError, RedisPool, Table};
use futures::StreamExt;
use tracing::info;
use uuid::Uuid;

use super::{BackingStore, ChangeStream};
use crate::error::{CosmosError, CosmosResult};

/// [`BackingStore`] backed by Redis hashes and Pub/Sub.
#[derive(Clone)]
pub struct RedisStore {
    pool: RedisPool,
}

impl RedisStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Connect to `redis_url`.
    pub async fn connect(redis_url: &str) -> CosmosResult<Self> {
        let pool = cosmos_redis::init_pool(redis_url).await?;
        info!(redis_url = %redis_url, "Connected to backing store");
        Ok(Self::new(pool))
    }
}

/// Turn the row layer's generic not-found into the entity-specific error.
fn not_found(err: RedisError, entity: impl FnOnce() -> CosmosError) -> CosmosError {
    match err {
        RedisError::NotFound(_) => entity(),
        other => CosmosError::Store(other),
    }
}

#[async_trait]
impl BackingStore for RedisStore {
    async fn fetch_projects(&self) -> CosmosResult<Vec<ProjectRow>> {
        Ok(projects::list_projects(&self.pool).await?)
    }

    async fn fetch_tasks(&self) -> CosmosResult<Vec<TaskRow>> {
        Ok(tasks::list_tasks(&self.pool).await?)
    }

    async fn fetch_team(&self) -> CosmosResult<Vec<TeamMemberRow>> {
        Ok(team::list_members(&self.pool).await?)
    }

    async fn insert_task(&self, draft: &TaskDraft) -> CosmosResult<TaskRow> {
        let id = Uuid::new_v4().to_string();
        Ok(tasks::create_task(&self.pool, &id, draft).await?)
    }

    async fn update_task(&self, id: &str, draft: &TaskDraft) -> CosmosResult<TaskRow> {
        tasks::update_task(&self.pool, id, draft)
            .await
            .map_err(|e| not_found(e, || CosmosError::TaskNotFound(id.to_string())))
    }

    async fn update_task_status(&self, id: &str, status: &str) -> CosmosResult<TaskRow> {
        tasks::update_task_status(&self.pool, id, status)
            .await
            .map_err(|e| not_found(e, || CosmosError::TaskNotFound(id.to_string())))
    }

    async fn delete_task(&self, id: &str) -> CosmosResult<()> {
        tasks::delete_task(&self.pool, id)
            .await
            .map_err(|e| not_found(e, || CosmosError::TaskNotFound(id.to_string())))
    }

    async fn insert_member(&self, name: &str, role: &str) -> CosmosResult<TeamMemberRow> {
        let id = Uuid::new_v4().to_string();
        Ok(team::create_member(&self.pool, &id, name, role).await?)
    }

    async fn update_member(&self, id: &str, name: &str, role: &str) -> CosmosResult<TeamMemberRow> {
        team::update_member(&self.pool, id, name, role)
            .await
            .map_err(|e| not_found(e, || CosmosError::MemberNotFound(id.to_string())))
    }

    async fn delete_member(&self, id: &str) -> CosmosResult<()> {
        team::delete_member(&self.pool, id)
            .await
            .map_err(|e| not_found(e, || CosmosError::MemberNotFound(id.to_string())))
    }

    async fn insert_project(
        &self,
        name: &str,
        description: Option<&str>,
        deadline: Option<&str>,
    ) -> CosmosResult<ProjectRow> {
        let id = Uuid::new_v4().to_string();
        Ok(projects::create_project(&self.pool, &id, name, description, deadline).await?)
    }

    async fn delete_project(&self, id: &str) -> CosmosResult<()> {
        projects::delete_project(&self.pool, id)
            .await
            .map_err(|e| not_found(e, || CosmosError::ProjectNotFound(id.to_string())))
    }

    async fn subscribe(&self, table: Table) -> CosmosResult<ChangeStream> {
        let stream = cosmos_redis::broadcast::subscribe(&self.pool, table).await?;
        Ok(stream.boxed())
    }
}
