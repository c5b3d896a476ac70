//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps and the response-code vocabulary shared by the
//! credential and live view-count paths.

mod errors;
mod ids;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ConnectionId, ProductId, UserId};
pub use timestamp::Timestamp;
