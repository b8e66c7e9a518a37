//! Change-feed listener.
//!
//! One background task per table. Any insert, update or delete on a watched
//! table triggers a full [`EntityCache::refresh`]; the row payload itself is
//! not used.

use std::sync::Arc;

use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use cosmos_redis::{ChangeEvent, Table};

use crate::cache::EntityCache;
use crate::error::CosmosResult;
use crate::store::{BackingStore, ChangeStream};

struct Subscription {
    table: Table,
    handle: JoinHandle<()>,
}

/// Live subscriptions for a cache. Dropping the listener releases them.
pub struct ChangeFeedListener {
    subscriptions: Vec<Subscription>,
}

impl ChangeFeedListener {
    /// Subscribe to every table in `tables`.
    ///
    /// If any subscription cannot be opened, the ones already opened are
    /// released and the error is returned.
    pub async fn start(
        store: Arc<dyn BackingStore>,
        cache: Arc<EntityCache>,
        tables: &[Table],
    ) -> CosmosResult<Self> {
        let mut listener = Self {
            subscriptions: Vec::with_capacity(tables.len()),
        };

        for &table in tables {
            let stream = match store.subscribe(table).await {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(%table, error = %e, "Could not subscribe to change feed");
                    listener.release();
                    return Err(e);
                }
            };
            let handle = tokio::spawn(listen(table, stream, cache.clone()));
            listener.subscriptions.push(Subscription { table, handle });
        }

        info!(tables = listener.subscriptions.len(), "Change feed listening");
        Ok(listener)
    }

    /// Subscribe to tasks, projects and team.
    pub async fn start_all(store: Arc<dyn BackingStore>, cache: Arc<EntityCache>) -> CosmosResult<Self> {
        Self::start(store, cache, &Table::ALL).await
    }

    /// Tables with a running listener.
    pub fn active_subscriptions(&self) -> Vec<Table> {
        self.subscriptions
            .iter()
            .filter(|s| !s.handle.is_finished())
            .map(|s| s.table)
            .collect()
    }

    /// Stop every listener. Safe to call more than once.
    pub fn release(&mut self) {
        for sub in self.subscriptions.drain(..) {
            sub.handle.abort();
            debug!(table = %sub.table, "Change feed released");
        }
    }
}

impl Drop for ChangeFeedListener {
    fn drop(&mut self) {
        self.release();
    }
}

async fn listen(table: Table, mut stream: ChangeStream, cache: Arc<EntityCache>) {
    while let Some(event) = stream.next().await {
        log_event(&event);
        // A failed refresh already logged and left the previous snapshot.
        let _ = cache.refresh().await;
    }
    debug!(%table, "Change stream ended");
}

fn log_event(event: &ChangeEvent) {
    match &event.row_id {
        Some(id) => debug!(table = %event.table, kind = ?event.kind, row_id = %id, "Change received"),
        None => debug!(table = %event.table, kind = ?event.kind, "Resync requested"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheEvent;
    use std::time::Duration;
    use tokio::time::timeout;

    use crate::store::MemoryStore;

    async fn next_refresh(rx: &mut tokio::sync::broadcast::Receiver<CacheEvent>) -> CacheEvent {
        timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("refresh within timeout")
            .expect("event channel open")
    }

    #[tokio::test]
    async fn test_external_insert_triggers_refresh() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(EntityCache::new(store.clone()));
        cache.refresh().await.unwrap();
        let mut events = cache.subscribe();

        let listener = ChangeFeedListener::start_all(store.clone(), cache.clone()).await.unwrap();
        assert_eq!(listener.active_subscriptions().len(), 3);

        // Written by another client, straight to the store.
        store.insert_member("Dimas", "Backend Dev").await.unwrap();

        next_refresh(&mut events).await;
        assert_eq!(cache.team().len(), 1);
        assert_eq!(cache.team()[0].name, "Dimas");
    }

    #[tokio::test]
    async fn test_only_watched_tables_refresh() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(EntityCache::new(store.clone()));
        let mut events = cache.subscribe();

        let _listener = ChangeFeedListener::start(store.clone(), cache.clone(), &[Table::Tasks])
            .await
            .unwrap();
        store.insert_member("Dimas", "Backend Dev").await.unwrap();

        assert!(timeout(Duration::from_millis(200), events.recv()).await.is_err());
        assert!(!cache.is_loaded());
    }

    #[tokio::test]
    async fn test_release_stops_listening() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(EntityCache::new(store.clone()));
        let mut events = cache.subscribe();

        let mut listener = ChangeFeedListener::start_all(store.clone(), cache.clone()).await.unwrap();
        listener.release();
        assert!(listener.active_subscriptions().is_empty());
        listener.release();

        store.insert_member("Dimas", "Backend Dev").await.unwrap();
        assert!(timeout(Duration::from_millis(200), events.recv()).await.is_err());
    }

    #[tokio::test]
    async fn test_failed_subscribe_returns_error() {
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(EntityCache::new(store.clone()));
        store.set_offline(true);

        let result = ChangeFeedListener::start_all(store.clone(), cache).await;
        assert!(result.is_err());
    }
}
