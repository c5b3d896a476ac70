//! Ports - Interfaces for external dependencies.
//!
//! Ports define the contracts between the domain and the outside world.
//! Adapters implement these ports.
//!
//! ## Credential Ports
//!
//! - `TokenCodec` - Sign, verify and parse compact bearer credentials
//! - `SessionStore` - The single stored refresh credential per user
//!
//! ## Live View-Count Ports
//!
//! - `ViewCounterCache` - Atomic counters and snapshot cache in the shared store
//! - `MembershipRegistry` - Which users are attached to which channel
//! - `MessageBroker` - Publish/subscribe transport for view-count events

mod cache_error;
mod membership_registry;
mod message_broker;
mod session_store;
mod token_codec;
mod view_counter_cache;

pub use cache_error::CacheError;
pub use membership_registry::MembershipRegistry;
pub use message_broker::{BrokerMessage, BrokerStream, MessageBroker};
pub use session_store::SessionStore;
pub use token_codec::TokenCodec;
pub use view_counter_cache::ViewCounterCache;
