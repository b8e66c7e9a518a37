//! In-memory mirror of the three synced collections.
//!
//! The cache never originates data. [`EntityCache::refresh`] reloads every
//! collection and swaps in a whole new [`Snapshot`], so readers see either
//! the old set or the new set, never a mix. Refreshes are not serialized
//! against each other: whichever response arrives last wins.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::error::CosmosResult;
use crate::project::Project;
use crate::store::BackingStore;
use crate::task::Task;
use crate::team::TeamMember;

/// One consistent view of all three collections.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Snapshot {
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub team: Vec<TeamMember>,
    /// 0 until the first refresh lands.
    pub revision: u64,
    pub refreshed_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }
}

/// Notification sent to live views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum CacheEvent {
    Refreshed { revision: u64 },
}

/// What happened to a refresh whose fetches succeeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { revision: u64 },
    /// The cache was closed while the fetch was in flight.
    Discarded,
}

pub struct EntityCache {
    store: Arc<dyn BackingStore>,
    current: RwLock<Arc<Snapshot>>,
    attached: AtomicBool,
    events: broadcast::Sender<CacheEvent>,
}

impl EntityCache {
    pub fn new(store: Arc<dyn BackingStore>) -> Self {
        let (events, _rx) = broadcast::channel(64);
        Self {
            store,
            current: RwLock::new(Arc::new(Snapshot::default())),
            attached: AtomicBool::new(true),
            events,
        }
    }

    /// Reload projects, tasks and team and swap them in together.
    ///
    /// On any fetch failure the previous snapshot stays in place and the
    /// error is returned.
    pub async fn refresh(&self) -> CosmosResult<RefreshOutcome> {
        let fetched = tokio::try_join!(
            self.store.fetch_projects(),
            self.store.fetch_tasks(),
            self.store.fetch_team(),
        );
        let (project_rows, task_rows, team_rows) = match fetched {
            Ok(rows) => rows,
            Err(e) => {
                warn!(error = %e, "Refresh failed, keeping previous snapshot");
                return Err(e);
            }
        };

        if !self.is_attached() {
            debug!("Cache closed during refresh, discarding response");
            return Ok(RefreshOutcome::Discarded);
        }

        let projects = project_rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                Project::from_row(row)
                    .map_err(|e| warn!(project_id = %id, error = %e, "Skipping malformed project row"))
                    .ok()
            })
            .collect();
        let tasks = task_rows
            .into_iter()
            .filter_map(|row| {
                let id = row.id.clone();
                Task::from_row(row)
                    .map_err(|e| warn!(task_id = %id, error = %e, "Skipping malformed task row"))
                    .ok()
            })
            .collect();
        let team = team_rows.into_iter().map(TeamMember::from_row).collect();

        // Numbered under the write lock so the installed revision only grows.
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let revision = current.revision + 1;
        let snapshot = Snapshot {
            projects,
            tasks,
            team,
            revision,
            refreshed_at: Some(Utc::now()),
        };
        debug!(
            revision,
            projects = snapshot.projects.len(),
            tasks = snapshot.tasks.len(),
            team = snapshot.team.len(),
            "Snapshot refreshed"
        );
        *current = Arc::new(snapshot);
        // Nobody listening is fine.
        let _ = self.events.send(CacheEvent::Refreshed { revision });
        drop(current);

        Ok(RefreshOutcome::Applied { revision })
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn projects(&self) -> Vec<Project> {
        self.snapshot().projects.clone()
    }

    pub fn tasks(&self) -> Vec<Task> {
        self.snapshot().tasks.clone()
    }

    pub fn team(&self) -> Vec<TeamMember> {
        self.snapshot().team.clone()
    }

    /// True once any refresh has been applied.
    pub fn is_loaded(&self) -> bool {
        self.snapshot().revision > 0
    }

    /// Receive a [`CacheEvent`] after every applied refresh.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheEvent> {
        self.events.subscribe()
    }

    /// Detach the cache from its consumer. Responses arriving afterwards are
    /// discarded.
    pub fn close(&self) {
        self.attached.store(false, Ordering::SeqCst);
    }

    pub fn is_attached(&self) -> bool {
        self.attached.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics;
    use crate::store::MemoryStore;
    use cosmos_redis::tasks::TaskDraft;

    fn draft(project_id: &str, title: &str, status: &str) -> TaskDraft {
        TaskDraft {
            project_id: project_id.to_string(),
            title: title.to_string(),
            description: None,
            kanban_status: Some(status.to_string()),
            assignee: None,
            deadline: None,
        }
    }

    async fn seeded() -> (Arc<MemoryStore>, EntityCache) {
        let store = Arc::new(MemoryStore::new());
        let project = store.insert_project("Website", None, None).await.unwrap();
        store.insert_task(&draft(&project.id, "Design", "done")).await.unwrap();
        store.insert_task(&draft(&project.id, "Build", "inprogress")).await.unwrap();
        store.insert_member("Rina", "Frontend Dev").await.unwrap();
        let cache = EntityCache::new(store.clone());
        (store, cache)
    }

    #[tokio::test]
    async fn test_refresh_loads_all_collections() {
        let (_store, cache) = seeded().await;
        assert!(!cache.is_loaded());

        let outcome = cache.refresh().await.unwrap();
        assert_eq!(outcome, RefreshOutcome::Applied { revision: 1 });

        let snapshot = cache.snapshot();
        assert_eq!(snapshot.projects.len(), 1);
        assert_eq!(snapshot.tasks.len(), 2);
        assert_eq!(snapshot.team.len(), 1);
        assert_eq!(snapshot.tasks[0].project_name.as_deref(), Some("Website"));
        assert!(cache.is_loaded());
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_snapshot() {
        let (store, cache) = seeded().await;
        cache.refresh().await.unwrap();
        let before = cache.snapshot();

        store.set_offline(true);
        assert!(cache.refresh().await.is_err());

        let after = cache.snapshot();
        assert!(Arc::ptr_eq(&before, &after));
        assert_eq!(after.tasks.len(), 2);
    }

    #[tokio::test]
    async fn test_repeated_refresh_gives_identical_aggregates() {
        let (_store, cache) = seeded().await;
        let now = Utc::now();

        cache.refresh().await.unwrap();
        let first = analytics::dashboard_stats(&cache.snapshot().tasks, now);
        cache.refresh().await.unwrap();
        let second = analytics::dashboard_stats(&cache.snapshot().tasks, now);

        assert_eq!(first, second);
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_closed_cache_discards_responses() {
        let (store, cache) = seeded().await;
        cache.refresh().await.unwrap();

        store.insert_task(&draft("p-x", "Late", "todo")).await.unwrap();
        cache.close();

        assert_eq!(cache.refresh().await.unwrap(), RefreshOutcome::Discarded);
        assert_eq!(cache.snapshot().tasks.len(), 2);
        assert_eq!(cache.snapshot().revision, 1);
    }

    #[tokio::test]
    async fn test_malformed_rows_are_skipped() {
        let (store, cache) = seeded().await;
        let mut bad = cosmos_redis::tasks::TaskRow::new("t-bad", &draft("p-1", "Odd", "todo"), Utc::now());
        bad.kanban_status = "review".to_string();
        store.seed_task(bad);

        cache.refresh().await.unwrap();
        assert_eq!(cache.tasks().len(), 2);
        assert!(cache.snapshot().task("t-bad").is_none());
    }

    #[tokio::test]
    async fn test_refresh_emits_event() {
        let (_store, cache) = seeded().await;
        let mut events = cache.subscribe();
        cache.refresh().await.unwrap();
        assert_eq!(events.recv().await.unwrap(), CacheEvent::Refreshed { revision: 1 });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_refreshes_only_move_forward() {
        let (_store, cache) = seeded().await;
        let cache = Arc::new(cache);
        let mut events = cache.subscribe();

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let cache = cache.clone();
                tokio::spawn(async move { cache.refresh().await })
            })
            .collect();
        let mut applied = Vec::new();
        for handle in handles {
            match handle.await.unwrap().unwrap() {
                RefreshOutcome::Applied { revision } => applied.push(revision),
                RefreshOutcome::Discarded => panic!("cache is attached"),
            }
        }

        applied.sort_unstable();
        assert_eq!(applied, (1..=16).collect::<Vec<u64>>());
        assert_eq!(cache.snapshot().revision, 16);

        let mut last = 0;
        for _ in 0..16 {
            let CacheEvent::Refreshed { revision } = events.recv().await.unwrap();
            assert!(revision > last, "revision {} after {}", revision, last);
            last = revision;
        }
    }
}
