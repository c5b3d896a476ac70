//! PostgreSQL implementation of SessionStore.
//!
//! Table `refresh_token`: one row per user, keyed by `user_id`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::domain::auth::SessionRecord;
use crate::domain::foundation::{DomainError, Timestamp, UserId};
use crate::ports::SessionStore;

#[derive(Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionStore for PostgresSessionStore {
    async fn upsert(&self, user_id: UserId, refresh_token: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO refresh_token (user_id, refresh_token, created_date, changed_date)
            VALUES ($1, $2, now(), now())
            ON CONFLICT (user_id) DO UPDATE SET
                refresh_token = EXCLUDED.refresh_token,
                changed_date = now()
            "#,
        )
        .bind(user_id.value())
        .bind(refresh_token)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to upsert refresh token: {}", e)))?;

        Ok(())
    }

    async fn find(&self, user_id: UserId) -> Result<Option<SessionRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT user_id, refresh_token, created_date, changed_date
            FROM refresh_token
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database(format!("Failed to fetch refresh token: {}", e)))?;

        row.map(|row| row_to_record(&row)).transpose()
    }

    async fn delete(&self, user_id: UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM refresh_token WHERE user_id = $1")
            .bind(user_id.value())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::database(format!("Failed to delete refresh token: {}", e))
            })?;

        tracing::debug!(
            user_id = %user_id,
            rows = result.rows_affected(),
            "Deleted refresh token"
        );
        Ok(())
    }
}

fn row_to_record(row: &sqlx::postgres::PgRow) -> Result<SessionRecord, DomainError> {
    let decode_err = |e: sqlx::Error| DomainError::database(format!("Failed to decode row: {}", e));

    let user_id: i64 = row.try_get("user_id").map_err(decode_err)?;
    let refresh_token: String = row.try_get("refresh_token").map_err(decode_err)?;
    let created: DateTime<Utc> = row.try_get("created_date").map_err(decode_err)?;
    let changed: DateTime<Utc> = row.try_get("changed_date").map_err(decode_err)?;

    Ok(SessionRecord {
        user_id: UserId::new(user_id),
        refresh_token,
        created_at: Timestamp::from_datetime(created),
        updated_at: Timestamp::from_datetime(changed),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running database: DATABASE_URL=postgres://... cargo test -- --ignored
    #[tokio::test]
    #[ignore]
    async fn upsert_replaces_and_delete_removes() {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL");
        let pool = PgPool::connect(&url).await.unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        let store = PostgresSessionStore::new(pool);
        let user = UserId::new(900_001);

        store.upsert(user, "first").await.unwrap();
        store.upsert(user, "second").await.unwrap();
        let record = store.find(user).await.unwrap().unwrap();
        assert_eq!(record.refresh_token, "second");

        store.delete(user).await.unwrap();
        assert!(store.find(user).await.unwrap().is_none());
    }
}
