//! Drag-and-drop board for one project, or for every project at once.
//!
//! A drop is applied to a local shadow state first so the card moves
//! immediately. The status write then goes through the gateway; on failure
//! the shadow entry is rolled back and the caller gets a notice.

pub mod model;

pub use model::{Board, BoardColumn, DropOutcome, IgnoreReason};

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{debug, warn};

use crate::cache::EntityCache;
use crate::gateway::{MutationGateway, Notice};
use crate::task::{Task, TaskStatus};

pub struct BoardSession {
    /// `None` shows every project's cards on one board.
    project_id: Option<String>,
    cache: Arc<EntityCache>,
    gateway: MutationGateway,
    /// Optimistic column per task id, pending confirmation.
    shadow: Mutex<HashMap<String, TaskStatus>>,
}

impl BoardSession {
    pub fn new(project_id: Option<&str>, cache: Arc<EntityCache>, gateway: MutationGateway) -> Self {
        Self {
            project_id: project_id.map(str::to_string),
            cache,
            gateway,
            shadow: Mutex::new(HashMap::new()),
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    fn in_scope(&self, task: &Task) -> bool {
        self.project_id.as_deref().map_or(true, |id| task.project_id == id)
    }

    /// Whether cards may be picked up at all.
    pub fn can_drag(&self) -> bool {
        self.gateway.role().can_drag()
    }

    fn shadow(&self) -> MutexGuard<'_, HashMap<String, TaskStatus>> {
        self.shadow.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Column a card currently shows in, shadow state first.
    pub fn displayed_status(&self, task_id: &str) -> Option<TaskStatus> {
        if let Some(status) = self.shadow().get(task_id) {
            return Some(*status);
        }
        self.cache
            .snapshot()
            .task(task_id)
            .filter(|t| self.in_scope(t))
            .map(|t| t.status)
    }

    /// The board as it should be drawn now.
    pub fn board(&self) -> Board {
        let snapshot = self.cache.snapshot();
        let shadow = self.shadow().clone();

        let columns = TaskStatus::ALL
            .iter()
            .map(|&status| BoardColumn {
                status,
                title: status.title().to_string(),
                tasks: snapshot
                    .tasks
                    .iter()
                    .filter(|t| self.in_scope(t))
                    .filter(|t| shadow.get(&t.id).copied().unwrap_or(t.status) == status)
                    .cloned()
                    .collect(),
            })
            .collect();

        Board {
            project_id: self.project_id.clone(),
            columns,
        }
    }

    /// Handle a card released over `destination` (a column id such as
    /// `"inprogress"`), or over nothing.
    pub async fn drop_card(&self, task_id: &str, destination: Option<&str>) -> DropOutcome {
        let Some(target) = destination.and_then(|d| d.parse::<TaskStatus>().ok()) else {
            return DropOutcome::Ignored { reason: IgnoreReason::NoTarget };
        };
        if !self.can_drag() {
            return DropOutcome::Ignored { reason: IgnoreReason::ReadOnly };
        }
        let Some(current) = self.displayed_status(task_id) else {
            return DropOutcome::Ignored { reason: IgnoreReason::UnknownTask };
        };
        if current == target {
            return DropOutcome::Ignored { reason: IgnoreReason::SameColumn };
        }

        let previous = self.shadow().insert(task_id.to_string(), target);
        debug!(task_id, from = %current, to = %target, "Card moved optimistically");

        match self.gateway.update_task_status(task_id, target).await {
            Ok(task) => {
                let mut shadow = self.shadow();
                if shadow.get(task_id) == Some(&target) {
                    shadow.remove(task_id);
                }
                DropOutcome::Moved { task }
            }
            Err(e) => {
                warn!(task_id, error = %e, "Status write failed, reverting card");
                {
                    let mut shadow = self.shadow();
                    match previous {
                        Some(status) => shadow.insert(task_id.to_string(), status),
                        None => shadow.remove(task_id),
                    };
                }
                DropOutcome::Reverted {
                    notice: Notice::from(&e),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionRole;
    use crate::store::{BackingStore, MemoryStore, Mutation};
    use crate::task::TaskInput;

    struct Fixture {
        store: Arc<MemoryStore>,
        cache: Arc<EntityCache>,
        project_id: String,
        task_id: String,
    }

    async fn fixture() -> Fixture {
        let store = Arc::new(MemoryStore::new());
        let project = store.insert_project("Website", None, None).await.unwrap();
        let cache = Arc::new(EntityCache::new(store.clone()));
        let admin = MutationGateway::new(store.clone(), cache.clone(), SessionRole::Admin);
        let mut input = TaskInput::new(&project.id, "Hero section");
        input.description = Some("Landing hero".to_string());
        let task = admin.create_task(input).await.unwrap();
        Fixture {
            store,
            cache,
            project_id: project.id,
            task_id: task.id,
        }
    }

    fn session(f: &Fixture, role: SessionRole) -> BoardSession {
        let gateway = MutationGateway::new(f.store.clone(), f.cache.clone(), role);
        BoardSession::new(Some(&f.project_id), f.cache.clone(), gateway)
    }

    fn global_session(f: &Fixture, role: SessionRole) -> BoardSession {
        let gateway = MutationGateway::new(f.store.clone(), f.cache.clone(), role);
        BoardSession::new(None, f.cache.clone(), gateway)
    }

    #[tokio::test]
    async fn test_drop_todo_into_done_issues_one_status_write() {
        let f = fixture().await;
        let board = session(&f, SessionRole::Member);
        let before = f.store.journal().len();

        let outcome = board.drop_card(&f.task_id, Some("done")).await;
        assert!(matches!(outcome, DropOutcome::Moved { .. }));

        let journal = f.store.journal();
        assert_eq!(journal.len(), before + 1);
        assert_eq!(
            journal.last(),
            Some(&Mutation::UpdateTaskStatus { id: f.task_id.clone(), status: "done".to_string() })
        );

        let task = f.cache.snapshot().task(&f.task_id).cloned().unwrap();
        assert_eq!(task.status, TaskStatus::Done);
        assert_eq!(task.title, "Hero section");
        assert_eq!(task.description.as_deref(), Some("Landing hero"));
        assert_eq!(board.board().column(TaskStatus::Done).unwrap().tasks.len(), 1);
    }

    #[tokio::test]
    async fn test_any_column_to_column_move_is_allowed() {
        let f = fixture().await;
        let board = session(&f, SessionRole::Admin);
        assert!(matches!(board.drop_card(&f.task_id, Some("done")).await, DropOutcome::Moved { .. }));
        assert!(matches!(board.drop_card(&f.task_id, Some("todo")).await, DropOutcome::Moved { .. }));
        assert_eq!(board.displayed_status(&f.task_id), Some(TaskStatus::Todo));
    }

    #[tokio::test]
    async fn test_drop_without_target_is_noop() {
        let f = fixture().await;
        let board = session(&f, SessionRole::Admin);
        let before = f.store.journal();

        for destination in [None, Some("archive")] {
            let outcome = board.drop_card(&f.task_id, destination).await;
            assert!(matches!(outcome, DropOutcome::Ignored { reason: IgnoreReason::NoTarget }));
        }
        assert_eq!(f.store.journal(), before);
    }

    #[tokio::test]
    async fn test_viewer_drop_is_noop() {
        let f = fixture().await;
        let board = session(&f, SessionRole::Viewer);
        assert!(!board.can_drag());
        let before = f.store.journal();

        let outcome = board.drop_card(&f.task_id, Some("inprogress")).await;
        assert!(matches!(outcome, DropOutcome::Ignored { reason: IgnoreReason::ReadOnly }));
        assert_eq!(f.store.journal(), before);
        assert_eq!(board.displayed_status(&f.task_id), Some(TaskStatus::Todo));
    }

    #[tokio::test]
    async fn test_same_column_and_foreign_cards_are_ignored() {
        let f = fixture().await;
        let board = session(&f, SessionRole::Admin);
        assert!(matches!(
            board.drop_card(&f.task_id, Some("todo")).await,
            DropOutcome::Ignored { reason: IgnoreReason::SameColumn }
        ));

        let other = BoardSession::new(
            Some("another-project"),
            f.cache.clone(),
            MutationGateway::new(f.store.clone(), f.cache.clone(), SessionRole::Admin),
        );
        assert!(matches!(
            other.drop_card(&f.task_id, Some("done")).await,
            DropOutcome::Ignored { reason: IgnoreReason::UnknownTask }
        ));
    }

    #[tokio::test]
    async fn test_failed_write_reverts_card() {
        let f = fixture().await;
        let board = session(&f, SessionRole::Admin);
        f.store.set_offline(true);

        let outcome = board.drop_card(&f.task_id, Some("inprogress")).await;
        match outcome {
            DropOutcome::Reverted { notice } => assert!(notice.message.contains("unavailable")),
            other => panic!("expected revert, got {:?}", other),
        }
        assert_eq!(board.displayed_status(&f.task_id), Some(TaskStatus::Todo));
        assert_eq!(board.board().column(TaskStatus::Todo).unwrap().tasks.len(), 1);
        assert!(board.board().column(TaskStatus::InProgress).unwrap().tasks.is_empty());

        f.store.set_offline(false);
        let rows = f.store.fetch_tasks().await.unwrap();
        assert_eq!(rows[0].kanban_status, "todo");
    }

    #[tokio::test]
    async fn test_global_board_spans_projects() {
        let f = fixture().await;
        let mobile = f.store.insert_project("Mobile App", None, None).await.unwrap();
        let admin = MutationGateway::new(f.store.clone(), f.cache.clone(), SessionRole::Admin);
        let alerts = admin.create_task(TaskInput::new(&mobile.id, "Push alerts")).await.unwrap();

        let board = global_session(&f, SessionRole::Member);
        assert_eq!(board.project_id(), None);
        let drawn = board.board();
        assert_eq!(drawn.project_id, None);
        assert_eq!(drawn.total_tasks(), 2);

        let todo = drawn.column(TaskStatus::Todo).unwrap();
        let mut labels: Vec<String> = todo.tasks.iter().map(|t| t.project_label()).collect();
        labels.sort();
        assert_eq!(labels, vec!["Mobile App".to_string(), "Website".to_string()]);

        let scoped = session(&f, SessionRole::Member);
        assert_eq!(scoped.board().total_tasks(), 1);
        assert_eq!(scoped.displayed_status(&alerts.id), None);
    }

    #[tokio::test]
    async fn test_drop_on_global_board_moves_any_project_card() {
        let f = fixture().await;
        let mobile = f.store.insert_project("Mobile App", None, None).await.unwrap();
        let admin = MutationGateway::new(f.store.clone(), f.cache.clone(), SessionRole::Admin);
        let alerts = admin.create_task(TaskInput::new(&mobile.id, "Push alerts")).await.unwrap();

        let board = global_session(&f, SessionRole::Member);
        let outcome = board.drop_card(&alerts.id, Some("inprogress")).await;
        match outcome {
            DropOutcome::Moved { task } => {
                assert_eq!(task.status, TaskStatus::InProgress);
                assert_eq!(task.project_id, mobile.id);
            }
            other => panic!("expected move, got {:?}", other),
        }
        assert_eq!(
            f.store.journal().last(),
            Some(&Mutation::UpdateTaskStatus { id: alerts.id.clone(), status: "inprogress".to_string() })
        );

        let drawn = board.board();
        let doing = drawn.column(TaskStatus::InProgress).unwrap();
        assert_eq!(doing.tasks.len(), 1);
        assert_eq!(doing.tasks[0].project_name.as_deref(), Some("Mobile App"));
        assert_eq!(drawn.column(TaskStatus::Todo).unwrap().tasks.len(), 1);
    }
}
