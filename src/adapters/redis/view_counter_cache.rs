//! Redis-backed view counters (`HINCRBY`) and snapshots (`SET EX`).

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::keys::{snapshot_key, view_count_key};
use super::unavailable;
use crate::domain::catalog::{ChannelName, ProductTree, ViewCountMap, SNAPSHOT_TTL_SECS};
use crate::domain::foundation::ProductId;
use crate::ports::{CacheError, ViewCounterCache};

#[derive(Clone)]
pub struct RedisViewCounterCache {
    conn: MultiplexedConnection,
}

impl RedisViewCounterCache {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl ViewCounterCache for RedisViewCounterCache {
    async fn increment(
        &self,
        channel: &ChannelName,
        product: ProductId,
    ) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        let count: i64 = conn
            .hincr(view_count_key(channel), product.value(), 1_i64)
            .await
            .map_err(unavailable)?;
        Ok(count)
    }

    async fn view_counts(&self, channel: &ChannelName) -> Result<ViewCountMap, CacheError> {
        let mut conn = self.conn.clone();
        let counts: ViewCountMap = conn
            .hgetall(view_count_key(channel))
            .await
            .map_err(unavailable)?;
        Ok(counts)
    }

    async fn set_snapshot(
        &self,
        channel: &ChannelName,
        tree: &ProductTree,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(tree)?;
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(snapshot_key(channel))
            .arg(payload)
            .arg("EX")
            .arg(SNAPSHOT_TTL_SECS)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn snapshot(&self, channel: &ChannelName) -> Result<ProductTree, CacheError> {
        let key = snapshot_key(channel);
        let mut conn = self.conn.clone();
        let payload: Option<String> = conn.get(&key).await.map_err(unavailable)?;
        let payload = payload.ok_or(CacheError::NotFound(key))?;
        Ok(serde_json::from_str(&payload)?)
    }

    async fn remaining_ttl(&self, channel: &ChannelName) -> Result<i64, CacheError> {
        let mut conn = self.conn.clone();
        let ttl: i64 = conn.ttl(snapshot_key(channel)).await.map_err(unavailable)?;
        Ok(ttl)
    }
}

impl std::fmt::Debug for RedisViewCounterCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisViewCounterCache").finish_non_exhaustive()
    }
}
