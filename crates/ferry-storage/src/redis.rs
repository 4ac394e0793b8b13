use async_trait::async_trait;
use ferry_core::{KeyValueStore, StoreError};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tracing::{debug, trace, warn};

type Result<T> = std::result::Result<T, StoreError>;

/// A Redis-backed [`KeyValueStore`].
///
/// Values are stored as plain strings with `GET`/`SET`/`DEL`; no conditional
/// commands are used. Every key is namespaced with a configurable prefix.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
    key_prefix: String,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StoreError {
    let message = format!("{operation}: {err}");
    if err.is_timeout() {
        StoreError::Timeout(message)
    } else if err.is_connection_refusal() || err.is_io_error() {
        StoreError::Unavailable(message)
    } else {
        StoreError::Operation(message)
    }
}

impl RedisStore {
    /// Creates a store from an existing connection manager, without a key prefix.
    pub fn new(conn: ConnectionManager) -> Self {
        Self::with_prefix(conn, "")
    }

    /// Creates a store whose keys are all prefixed with `key_prefix`
    /// (e.g. `"ferry:"`).
    pub fn with_prefix(conn: ConnectionManager, key_prefix: impl Into<String>) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a managed connection to `redis_url`.
    pub async fn connect(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| map_redis_error("invalid redis url", e))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|e| map_redis_error("failed to connect to Redis", e))?;
        Ok(Self::with_prefix(conn, key_prefix))
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let storage_key = self.storage_key(key);
        trace!(key = %storage_key, "Fetching value from Redis");

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(&storage_key)
            .await
            .map_err(|e| {
                warn!(key = %storage_key, error = %e, "Redis error on get");
                map_redis_error("failed to fetch value from Redis", e)
            })
    }

    async fn put(&self, key: &str, value: String) -> Result<()> {
        let storage_key = self.storage_key(key);
        trace!(key = %storage_key, "Writing value to Redis");

        let mut conn = self.conn.clone();
        match conn.set::<_, _, ()>(&storage_key, value).await {
            Ok(()) => {
                debug!(key = %storage_key, "Stored value in Redis");
                Ok(())
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Failed to write value to Redis");
                Err(map_redis_error("failed to write value to Redis", e))
            }
        }
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let storage_key = self.storage_key(key);
        trace!(key = %storage_key, "Removing value from Redis");

        let mut conn = self.conn.clone();
        match conn.del::<_, ()>(&storage_key).await {
            Ok(()) => {
                debug!(key = %storage_key, "Removed value from Redis");
                Ok(())
            }
            Err(e) => {
                warn!(key = %storage_key, error = %e, "Failed to remove value from Redis");
                Err(map_redis_error("failed to delete value from Redis", e))
            }
        }
    }
}
