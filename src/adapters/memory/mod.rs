//! In-memory adapters.
//!
//! Single-process stand-ins for Postgres and Redis. Used by the test suite
//! and for running the server without external stores. They share nothing
//! across processes, so never point more than one node at them.

mod message_broker;
mod session_store;
mod shared_cache;

pub use message_broker::InMemoryMessageBroker;
pub use session_store::InMemorySessionStore;
pub use shared_cache::InMemorySharedCache;
