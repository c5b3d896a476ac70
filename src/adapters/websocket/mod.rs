//! Live view-count sockets.
//!
//! ```text
//!  Redis PUBLISH <channel>
//!          │
//!          ▼
//!  PubSubBridge ──► TopicHub ──► Connection (per socket) ──► STOMP MESSAGE
//!                                    ▲
//!          CONNECT (Authorization + channelHeader) ── handshake ── MembershipRegistry::join
//! ```
//!
//! - [`stomp`] - frame codec
//! - [`handshake`] - CONNECT verification and channel join
//! - [`topics`] - per-channel broadcast fan-out
//! - [`bridge`] - broker subscription feeding the topics
//! - [`handler`] - axum upgrade handler and connection loop

pub mod bridge;
pub mod handler;
pub mod handshake;
pub mod stomp;
pub mod topics;

pub use bridge::PubSubBridge;
pub use handler::{ws_handler, INCREMENT_DESTINATION_PREFIX};
pub use handshake::{handshake, HandshakeError, SocketSession, AUTHORIZATION_HEADER, CHANNEL_HEADER};
pub use stomp::{Command, Frame, StompError};
pub use topics::TopicHub;
