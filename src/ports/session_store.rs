//! SessionStore port - one refresh credential row per user.

use async_trait::async_trait;

use crate::domain::auth::SessionRecord;
use crate::domain::foundation::{DomainError, UserId};

/// Persists the current refresh credential for each user.
///
/// There is no locking. Concurrent upserts for one user race and the last
/// write wins; the losing credential becomes a replay.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert or replace the row for `user_id`.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> Result<(), DomainError>;

    /// Returns `None` if the user has no session.
    async fn find(&self, user_id: UserId) -> Result<Option<SessionRecord>, DomainError>;

    /// Remove the row. Deleting a missing row is not an error.
    async fn delete(&self, user_id: UserId) -> Result<(), DomainError>;
}
