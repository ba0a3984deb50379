use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use super::model::{Account, NewAccount};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    DuplicateEmail,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for accounts. Implementations must enforce email uniqueness
/// themselves: `create` is the only authority on whether an email is taken.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account, failing with `DuplicateEmail` if the email exists.
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError>;

    /// Stamp `last_login_at` with the current time and return the new value.
    async fn record_login(&self, id: Uuid) -> Result<OffsetDateTime, StoreError>;
}
