//! Redis list-backed channel membership.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use super::keys::membership_key;
use super::unavailable;
use crate::domain::catalog::ChannelName;
use crate::domain::foundation::UserId;
use crate::ports::{CacheError, MembershipRegistry};

#[derive(Clone)]
pub struct RedisMembershipRegistry {
    conn: MultiplexedConnection,
}

impl RedisMembershipRegistry {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl MembershipRegistry for RedisMembershipRegistry {
    async fn join(&self, channel: &ChannelName, user: UserId) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // one entry per connection; leave removes exactly one
        conn.rpush::<_, _, ()>(membership_key(channel), user.value())
            .await
            .map_err(unavailable)?;
        Ok(())
    }

    async fn leave(&self, channel: &ChannelName, user: UserId) -> Result<bool, CacheError> {
        let mut conn = self.conn.clone();
        let removed: i64 = conn
            .lrem(membership_key(channel), 1, user.value())
            .await
            .map_err(unavailable)?;
        Ok(removed > 0)
    }

    async fn list(&self, channel: &ChannelName) -> Result<Vec<UserId>, CacheError> {
        let mut conn = self.conn.clone();
        let ids: Vec<i64> = conn
            .lrange(membership_key(channel), 0, -1)
            .await
            .map_err(unavailable)?;
        Ok(ids.into_iter().map(UserId::new).collect())
    }
}

impl std::fmt::Debug for RedisMembershipRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisMembershipRegistry").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running server: REDIS_URL=redis://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn each_connection_owns_one_entry() {
        let url = std::env::var("REDIS_URL").expect("REDIS_URL");
        let client = redis::Client::open(url).unwrap();
        let conn = client.get_multiplexed_tokio_connection().await.unwrap();
        let registry = RedisMembershipRegistry::new(conn);
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let channel = ChannelName::new(&format!("it-{}", &suffix[..12])).unwrap();

        registry.join(&channel, UserId::new(7)).await.unwrap();
        registry.join(&channel, UserId::new(8)).await.unwrap();
        registry.join(&channel, UserId::new(7)).await.unwrap();
        assert_eq!(
            registry.list(&channel).await.unwrap(),
            vec![UserId::new(7), UserId::new(8), UserId::new(7)]
        );

        assert!(registry.leave(&channel, UserId::new(7)).await.unwrap());
        assert_eq!(
            registry.list(&channel).await.unwrap(),
            vec![UserId::new(8), UserId::new(7)]
        );

        assert!(registry.leave(&channel, UserId::new(8)).await.unwrap());
        assert!(!registry.leave(&channel, UserId::new(8)).await.unwrap());
        assert!(registry.leave(&channel, UserId::new(7)).await.unwrap());
        assert!(registry.list(&channel).await.unwrap().is_empty());
    }
}
