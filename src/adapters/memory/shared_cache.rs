//! In-memory counters, snapshots and membership lists.
//!
//! Snapshot expiry uses `tokio::time::Instant`, so tests can drive it with a
//! paused clock.

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::domain::catalog::{ChannelName, ProductTree, ViewCountMap, SNAPSHOT_TTL_SECS};
use crate::domain::foundation::{ProductId, UserId};
use crate::ports::{CacheError, MembershipRegistry, ViewCounterCache};

struct CachedSnapshot {
    payload: String,
    expires_at: Instant,
}

#[derive(Default)]
struct State {
    counters: HashMap<ChannelName, ViewCountMap>,
    snapshots: HashMap<ChannelName, CachedSnapshot>,
    members: HashMap<ChannelName, Vec<UserId>>,
}

/// One lock over all keys gives the same per-command atomicity Redis does.
#[derive(Default)]
pub struct InMemorySharedCache {
    state: Mutex<State>,
}

impl InMemorySharedCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn live<'a>(state: &'a State, channel: &ChannelName) -> Option<&'a CachedSnapshot> {
        state
            .snapshots
            .get(channel)
            .filter(|snapshot| snapshot.expires_at > Instant::now())
    }
}

#[async_trait]
impl ViewCounterCache for InMemorySharedCache {
    async fn increment(
        &self,
        channel: &ChannelName,
        product: ProductId,
    ) -> Result<i64, CacheError> {
        let mut state = self.state.lock().await;
        let count = state
            .counters
            .entry(channel.clone())
            .or_default()
            .entry(product.value())
            .or_insert(0);
        *count = count.wrapping_add(1);
        Ok(*count)
    }

    async fn view_counts(&self, channel: &ChannelName) -> Result<ViewCountMap, CacheError> {
        let state = self.state.lock().await;
        Ok(state.counters.get(channel).cloned().unwrap_or_default())
    }

    async fn set_snapshot(
        &self,
        channel: &ChannelName,
        tree: &ProductTree,
    ) -> Result<(), CacheError> {
        let payload = serde_json::to_string(tree)?;
        let mut state = self.state.lock().await;
        state.snapshots.insert(
            channel.clone(),
            CachedSnapshot {
                payload,
                expires_at: Instant::now() + Duration::from_secs(SNAPSHOT_TTL_SECS),
            },
        );
        Ok(())
    }

    async fn snapshot(&self, channel: &ChannelName) -> Result<ProductTree, CacheError> {
        let state = self.state.lock().await;
        let snapshot = Self::live(&state, channel)
            .ok_or_else(|| CacheError::NotFound(format!("snapshot:{}", channel)))?;
        Ok(serde_json::from_str(&snapshot.payload)?)
    }

    async fn remaining_ttl(&self, channel: &ChannelName) -> Result<i64, CacheError> {
        let state = self.state.lock().await;
        Ok(match Self::live(&state, channel) {
            Some(snapshot) => {
                let remaining = snapshot.expires_at.saturating_duration_since(Instant::now());
                i64::try_from(remaining.as_secs()).unwrap_or(i64::MAX)
            }
            None => -2,
        })
    }
}

#[async_trait]
impl MembershipRegistry for InMemorySharedCache {
    async fn join(&self, channel: &ChannelName, user: UserId) -> Result<(), CacheError> {
        let mut state = self.state.lock().await;
        state.members.entry(channel.clone()).or_default().push(user);
        Ok(())
    }

    async fn leave(&self, channel: &ChannelName, user: UserId) -> Result<bool, CacheError> {
        let mut state = self.state.lock().await;
        let Some(members) = state.members.get_mut(channel) else {
            return Ok(false);
        };
        match members.iter().position(|member| *member == user) {
            Some(index) => {
                members.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self, channel: &ChannelName) -> Result<Vec<UserId>, CacheError> {
        let state = self.state.lock().await;
        Ok(state.members.get(channel).cloned().unwrap_or_default())
    }
}
