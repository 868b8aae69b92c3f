//! Redis-backed window counters shared between service instances

use crate::config::RedisConfig;
use crate::utils::error::{GatewayError, Result};
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::info;

/// Window counters stored as `keygate:rl:{identity}:{window_start}`
#[derive(Clone)]
pub struct RedisWindowStore {
    conn: MultiplexedConnection,
}

impl std::fmt::Debug for RedisWindowStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisWindowStore").finish_non_exhaustive()
    }
}

impl RedisWindowStore {
    pub async fn connect(config: &RedisConfig) -> Result<Self> {
        let client = Client::open(config.url.as_str()).map_err(GatewayError::Redis)?;
        let connect = client.get_multiplexed_async_connection();
        let conn = tokio::time::timeout(
            std::time::Duration::from_secs(config.connection_timeout),
            connect,
        )
        .await
        .map_err(|_| GatewayError::timeout("Redis connection timed out"))?
        .map_err(GatewayError::Redis)?;

        info!("Redis rate limit backend connected");
        Ok(Self { conn })
    }

    pub fn window_key(identity: &str, window_start: i64) -> String {
        format!("keygate:rl:{}:{}", identity, window_start)
    }

    /// Increment the window counter and return its new value. The key expires
    /// one second after the window ends.
    pub async fn increment(&self, identity: &str, window_start: i64, window_secs: u64) -> Result<u64> {
        let key = Self::window_key(identity, window_start);
        let mut conn = self.conn.clone();

        let (count,): (u64,) = redis::pipe()
            .atomic()
            .incr(&key, 1u64)
            .expire(&key, window_secs as i64 + 1)
            .ignore()
            .query_async(&mut conn)
            .await
            .map_err(GatewayError::Redis)?;

        Ok(count)
    }

    /// Current counter value without incrementing
    pub async fn current(&self, identity: &str, window_start: i64) -> Result<u64> {
        let key = Self::window_key(identity, window_start);
        let mut conn = self.conn.clone();
        let used: Option<u64> = conn.get(&key).await.map_err(GatewayError::Redis)?;
        Ok(used.unwrap_or(0))
    }
}
