//! Redis connection pool management.

use redis::aio::{ConnectionManager, PubSub};
use thiserror::Error;

/// Redis error types.
#[derive(Error, Debug)]
pub enum RedisError {
    #[error("Redis connection error: {0}")]
    Connection(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type for Redis operations.
pub type RedisResult<T> = Result<T, RedisError>;

/// Redis connection pool.
///
/// `ConnectionManager` handles multiplexing internally and is cheap to clone,
/// so callers take a fresh handle per operation with [`RedisPool::conn`].
/// Pub/Sub needs a dedicated connection, which is why the client is kept too.
#[derive(Clone)]
pub struct RedisPool {
    client: redis::Client,
    manager: ConnectionManager,
}

impl RedisPool {
    /// A multiplexed command connection.
    pub fn conn(&self) -> ConnectionManager {
        self.manager.clone()
    }

    /// Open a dedicated Pub/Sub connection.
    pub async fn pubsub(&self) -> RedisResult<PubSub> {
        Ok(self.client.get_async_pubsub().await?)
    }
}

/// Initialize a Redis connection pool from a URL.
///
/// Example URL: `redis://127.0.0.1:6379`
pub async fn init_pool(redis_url: &str) -> RedisResult<RedisPool> {
    let client = redis::Client::open(redis_url)?;
    let manager = ConnectionManager::new(client.clone()).await?;
    Ok(RedisPool { client, manager })
}

/// Fallback when neither config nor environment name a server.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
