use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::debug;
use uuid::Uuid;

use super::model::{Account, NewAccount};
use super::store::{AccountStore, StoreError};

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

/// A unique-key hit on insert can only be `accounts_email_key`.
fn map_insert_error(err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            debug!(constraint = ?db.constraint(), "insert hit unique key");
            StoreError::DuplicateEmail
        }
        other => StoreError::Database(other),
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (id, email, password_hash, full_name)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, full_name, created_at, last_login_at, is_active
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(&new.full_name)
        .fetch_one(&self.db)
        .await
        .map_err(map_insert_error)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, full_name, created_at, last_login_at, is_active
            FROM accounts
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT id, email, password_hash, full_name, created_at, last_login_at, is_active
            FROM accounts
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(account)
    }

    async fn record_login(&self, id: Uuid) -> Result<OffsetDateTime, StoreError> {
        let (at,): (OffsetDateTime,) = sqlx::query_as(
            r#"
            UPDATE accounts
               SET last_login_at = now()
             WHERE id = $1
            RETURNING last_login_at
            "#,
        )
        .bind(id)
        .fetch_one(&self.db)
        .await?;
        Ok(at)
    }
}
