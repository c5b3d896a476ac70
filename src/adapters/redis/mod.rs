//! Redis adapters for the shared cache and broker.
//!
//! Commands go through a cloned `MultiplexedConnection`; each is a single
//! atomic Redis command. Subscriptions use a dedicated pub/sub connection.

mod keys;
mod membership_registry;
mod message_broker;
mod view_counter_cache;

pub use keys::{membership_key, snapshot_key, view_count_key};
pub use membership_registry::RedisMembershipRegistry;
pub use message_broker::RedisMessageBroker;
pub use view_counter_cache::RedisViewCounterCache;

use crate::ports::CacheError;

pub(crate) fn unavailable(e: redis::RedisError) -> CacheError {
    CacheError::Unavailable(e.to_string())
}
