use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use crate::domain::auth::SessionRecord;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::SessionStore;

/// HashMap-backed session store.
#[derive(Default)]
pub struct InMemorySessionStore {
    rows: RwLock<HashMap<UserId, SessionRecord>>,
    fail_writes: AtomicBool,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent upsert and delete fail with `DatabaseError`.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DomainError::database("session store is read-only"));
        }
        Ok(())
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut rows = self.rows.write().await;
        match rows.get_mut(&user_id) {
            Some(record) => {
                record.refresh_token = refresh_token.to_string();
                record.updated_at = Timestamp::now();
            }
            None => {
                rows.insert(user_id, SessionRecord::new(user_id, refresh_token));
            }
        }
        Ok(())
    }

    async fn find(&self, user_id: UserId) -> Result<Option<SessionRecord>, DomainError> {
        Ok(self.rows.read().await.get(&user_id).cloned())
    }

    async fn delete(&self, user_id: UserId) -> Result<(), DomainError> {
        self.check_writable()?;
        self.rows.write().await.remove(&user_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upsert_keeps_one_row_per_user() {
        let store = InMemorySessionStore::new();
        let user = UserId::new(7);

        store.upsert(user, "first").await.unwrap();
        let created = store.find(user).await.unwrap().unwrap();
        store.upsert(user, "second").await.unwrap();
        let updated = store.find(user).await.unwrap().unwrap();

        assert_eq!(store.len().await, 1);
        assert_eq!(updated.refresh_token, "second");
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn delete_of_missing_row_is_ok() {
        let store = InMemorySessionStore::new();
        assert!(store.delete(UserId::new(1)).await.is_ok());
    }

    #[tokio::test]
    async fn failing_writes_leave_rows_untouched() {
        let store = InMemorySessionStore::new();
        let user = UserId::new(7);
        store.upsert(user, "kept").await.unwrap();

        store.fail_writes(true);
        assert!(store.delete(user).await.is_err());
        assert!(store.upsert(user, "lost").await.is_err());

        assert_eq!(store.find(user).await.unwrap().unwrap().refresh_token, "kept");
    }
}
