use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use super::model::{Account, NewAccount};
use super::store::{AccountStore, StoreError};

/// In-process store for tests. The email index and the rows live under one
/// lock so check-and-insert is atomic, mirroring the database constraint.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    by_id: HashMap<Uuid, Account>,
    by_email: HashMap<String, Uuid>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, new: NewAccount) -> Result<Account, StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.by_email.contains_key(&new.email) {
            return Err(StoreError::DuplicateEmail);
        }
        let account = Account {
            id: Uuid::new_v4(),
            email: new.email,
            password_hash: new.password_hash,
            full_name: new.full_name,
            created_at: OffsetDateTime::now_utc(),
            last_login_at: None,
            is_active: true,
        };
        inner.by_email.insert(account.email.clone(), account.id);
        inner.by_id.insert(account.id, account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .by_email
            .get(email)
            .and_then(|id| inner.by_id.get(id))
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Account>, StoreError> {
        Ok(self.inner.lock().await.by_id.get(&id).cloned())
    }

    async fn record_login(&self, id: Uuid) -> Result<OffsetDateTime, StoreError> {
        let mut inner = self.inner.lock().await;
        let account = inner
            .by_id
            .get_mut(&id)
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))?;
        let now = OffsetDateTime::now_utc();
        account.last_login_at = Some(now);
        Ok(now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            email: email.into(),
            password_hash: "hash".into(),
            full_name: "Test User".into(),
        }
    }

    #[tokio::test]
    async fn second_create_with_same_email_conflicts() {
        let store = MemoryAccountStore::new();
        store.create(new_account("a@x.com")).await.expect("first insert");
        let err = store.create(new_account("a@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateEmail));
    }

    #[tokio::test]
    async fn email_match_is_case_sensitive() {
        let store = MemoryAccountStore::new();
        store.create(new_account("a@x.com")).await.expect("lower");
        store.create(new_account("A@x.com")).await.expect("upper is distinct");
        assert!(store.find_by_email("A@X.COM").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn record_login_sets_timestamp() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("a@x.com")).await.unwrap();
        assert!(created.last_login_at.is_none());
        assert!(created.is_active);

        let at = store.record_login(created.id).await.unwrap();
        let found = store.find_by_id(created.id).await.unwrap().unwrap();
        assert_eq!(found.last_login_at, Some(at));
    }

    #[tokio::test]
    async fn record_login_for_unknown_id_errors() {
        let store = MemoryAccountStore::new();
        assert!(store.record_login(Uuid::new_v4()).await.is_err());
    }
}
