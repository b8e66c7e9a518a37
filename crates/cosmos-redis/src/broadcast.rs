//! Change notifications for the three synced tables.
//!
//! Every mutation publishes a [`ChangeEvent`] on the table's Redis Pub/Sub
//! channel. In-process stores reuse the same event type over a tokio
//! broadcast channel.

use futures::{Stream, StreamExt};
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::client::{RedisPool, RedisResult};

/// A table that emits change notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Table {
    Tasks,
    Projects,
    Team,
}

impl Table {
    /// All tables, in subscription order.
    pub const ALL: [Table; 3] = [Table::Tasks, Table::Projects, Table::Team];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tasks => "tasks",
            Self::Projects => "projects",
            Self::Team => "team",
        }
    }

    /// Pub/Sub channel carrying this table's events.
    pub fn channel(&self) -> String {
        format!("cosmos:changes:{}", self.as_str())
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-level change kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

/// A row-level change notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub table: Table,
    pub kind: ChangeKind,
    /// `None` when the subscriber lost track of what changed and should
    /// assume anything did.
    pub row_id: Option<String>,
}

impl ChangeEvent {
    pub fn new(table: Table, kind: ChangeKind, row_id: &str) -> Self {
        Self {
            table,
            kind,
            row_id: Some(row_id.to_string()),
        }
    }

    /// Event standing in for notifications a subscriber missed.
    pub fn resync(table: Table) -> Self {
        Self {
            table,
            kind: ChangeKind::Update,
            row_id: None,
        }
    }
}

/// Type alias for the in-process change sender.
pub type ChangeSender = broadcast::Sender<ChangeEvent>;

/// Type alias for the in-process change receiver.
pub type ChangeReceiver = broadcast::Receiver<ChangeEvent>;

/// Create a new in-process change channel with default capacity.
pub fn create_change_channel() -> ChangeSender {
    let (tx, _rx) = broadcast::channel(100);
    tx
}

/// Publish a change event on the table's channel.
pub async fn publish(pool: &RedisPool, event: &ChangeEvent) -> RedisResult<()> {
    let mut conn = pool.conn();
    let payload = serde_json::to_string(event)?;
    let receivers: i64 = conn.publish(event.table.channel(), payload).await?;
    debug!(table = %event.table, kind = ?event.kind, receivers, "Published change event");
    Ok(())
}

/// Publish after a committed write. A failed publish is logged and
/// swallowed: the row is already stored, and subscribers catch up on their
/// next refresh.
pub async fn announce(pool: &RedisPool, event: &ChangeEvent) {
    settle_publish(event, publish(pool, event).await);
}

/// Log a failed publish. Returns whether the event went out.
fn settle_publish(event: &ChangeEvent, result: RedisResult<()>) -> bool {
    match result {
        Ok(()) => true,
        Err(error) => {
            warn!(
                table = %event.table,
                kind = ?event.kind,
                row_id = event.row_id.as_deref().unwrap_or("-"),
                error = %error,
                "Change event not published"
            );
            false
        }
    }
}

/// Subscribe to one table's change channel.
///
/// The stream ends when the Pub/Sub connection drops. Undecodable payloads
/// are surfaced as [`ChangeEvent::resync`] so subscribers still refresh.
pub async fn subscribe(
    pool: &RedisPool,
    table: Table,
) -> RedisResult<impl Stream<Item = ChangeEvent> + Send + 'static> {
    let mut pubsub = pool.pubsub().await?;
    pubsub.subscribe(table.channel()).await?;

    let stream = pubsub.into_on_message().map(move |msg| {
        let decoded = msg
            .get_payload::<String>()
            .map_err(|e| e.to_string())
            .and_then(|payload| {
                serde_json::from_str::<ChangeEvent>(&payload).map_err(|e| e.to_string())
            });
        match decoded {
            Ok(event) => event,
            Err(error) => {
                warn!(table = %table, error = %error, "Undecodable change payload");
                ChangeEvent::resync(table)
            }
        }
    });

    Ok(stream)
}

/// Adapt an in-process receiver into a stream of one table's events.
///
/// A lagged receiver yields a single resync event rather than ending.
pub fn receiver_stream(
    rx: ChangeReceiver,
    table: Table,
) -> impl Stream<Item = ChangeEvent> + Send + 'static {
    futures::stream::unfold(rx, move |mut rx| async move {
        loop {
            match rx.recv().await {
                Ok(event) if event.table == table => return Some((event, rx)),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(table = %table, skipped, "Change receiver lagged");
                    return Some((ChangeEvent::resync(table), rx));
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    })
}
