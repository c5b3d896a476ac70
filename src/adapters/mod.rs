//! Adapters - implementations of port interfaces and transport surfaces.
//!
//! - `token` - HS512 credential codec
//! - `postgres` - refresh credential store
//! - `redis` - counters, snapshots, membership and pub/sub
//! - `memory` - in-process stand-ins for tests and local runs
//! - `http` - axum router, auth gate middleware, endpoints
//! - `websocket` - STOMP socket handshake, topics and broker bridge

pub mod http;
pub mod memory;
pub mod postgres;
pub mod redis;
pub mod token;
pub mod websocket;
