//! Wires store, cache, feed and gateways together for one consumer.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use tracing::info;

use crate::analytics::{self, DashboardStats, ProjectTally};
use crate::board::BoardSession;
use crate::cache::EntityCache;
use crate::error::CosmosResult;
use crate::feed::ChangeFeedListener;
use crate::gateway::MutationGateway;
use crate::session::SessionRole;
use crate::store::BackingStore;

pub struct Engine {
    store: Arc<dyn BackingStore>,
    cache: Arc<EntityCache>,
    listener: Mutex<Option<ChangeFeedListener>>,
}

impl Engine {
    /// Build the cache and load it once, without live updates.
    pub async fn load(store: Arc<dyn BackingStore>) -> CosmosResult<Self> {
        let cache = Arc::new(EntityCache::new(store.clone()));
        cache.refresh().await?;
        Ok(Self {
            store,
            cache,
            listener: Mutex::new(None),
        })
    }

    /// Load the cache and keep it current from the change feed.
    pub async fn start(store: Arc<dyn BackingStore>) -> CosmosResult<Self> {
        let engine = Self::load(store).await?;
        let listener = ChangeFeedListener::start_all(engine.store.clone(), engine.cache.clone()).await?;
        *engine.listener.lock().unwrap_or_else(PoisonError::into_inner) = Some(listener);
        info!("Engine started with live change feed");
        Ok(engine)
    }

    pub fn cache(&self) -> Arc<EntityCache> {
        self.cache.clone()
    }

    pub fn store(&self) -> Arc<dyn BackingStore> {
        self.store.clone()
    }

    pub fn is_live(&self) -> bool {
        self.listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn gateway(&self, role: SessionRole) -> MutationGateway {
        MutationGateway::new(self.store.clone(), self.cache.clone(), role)
    }

    /// A board session for one project, or for every project with `None`.
    pub fn board(&self, project_id: Option<&str>, role: SessionRole) -> BoardSession {
        BoardSession::new(project_id, self.cache.clone(), self.gateway(role))
    }

    pub fn stats(&self, now: DateTime<Utc>) -> DashboardStats {
        analytics::dashboard_stats(&self.cache.snapshot().tasks, now)
    }

    pub fn project_tallies(&self) -> Vec<ProjectTally> {
        analytics::project_tallies(&self.cache.snapshot().tasks)
    }

    /// Release the change feed and detach the cache.
    pub fn shutdown(&self) {
        if let Some(mut listener) = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            listener.release();
        }
        self.cache.close();
        info!("Engine shut down");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::RefreshOutcome;
    use crate::store::MemoryStore;
    use crate::task::TaskInput;

    #[tokio::test]
    async fn test_load_and_mutate() {
        let store = Arc::new(MemoryStore::new());
        let project = store.insert_project("Mobile App", None, None).await.unwrap();
        let engine = Engine::load(store.clone()).await.unwrap();
        assert!(!engine.is_live());
        assert!(engine.cache().is_loaded());

        engine
            .gateway(SessionRole::Member)
            .create_task(TaskInput::new(&project.id, "Login screen"))
            .await
            .unwrap();

        assert_eq!(engine.stats(Utc::now()).counts.todo, 1);
        assert_eq!(engine.project_tallies()[0].name, "Mobile App");
    }

    #[tokio::test]
    async fn test_shutdown_detaches_cache() {
        let store = Arc::new(MemoryStore::new());
        let engine = Engine::start(store.clone()).await.unwrap();
        assert!(engine.is_live());

        engine.shutdown();
        assert!(!engine.is_live());
        assert_eq!(engine.cache().refresh().await.unwrap(), RefreshOutcome::Discarded);
    }

    #[tokio::test]
    async fn test_load_fails_when_store_down() {
        let store = Arc::new(MemoryStore::new());
        store.set_offline(true);
        assert!(Engine::load(store).await.is_err());
    }
}
