//! Account operations

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::models::{Account, NewAccount};
use crate::repository::AccountStore;

/// In-memory account store
///
/// Accounts live in a flat list behind a read-write lock; lookups scan.
/// Fine for the account counts this service sees.
#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write();

        // Uniqueness covers inactive accounts, so a deactivated username
        // cannot be re-registered out from under its owner.
        if accounts.iter().any(|a| {
            a.username.eq_ignore_ascii_case(&account.username)
                || a.email.eq_ignore_ascii_case(&account.email)
        }) {
            return Err(StoreError::Duplicate(format!(
                "Account '{}' already exists",
                account.username
            )));
        }

        let created = Account {
            id: Uuid::new_v4().to_string(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            role: account.role,
            created_at: Utc::now(),
            last_login_at: None,
            is_active: true,
        };
        accounts.push(created.clone());
        Ok(created)
    }

    async fn get(&self, id: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read();
        Ok(accounts.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let accounts = self.accounts.read();
        Ok(accounts
            .iter()
            .find(|a| a.is_active && a.username.eq_ignore_ascii_case(username))
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.accounts.read().clone())
    }

    async fn record_login(&self, id: &str) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Account '{}' not found", id)))?;
        account.last_login_at = Some(Utc::now());
        Ok(())
    }

    async fn toggle_status(&self, id: &str) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write();
        let account = accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| StoreError::NotFound(format!("Account '{}' not found", id)))?;
        account.is_active = !account.is_active;
        Ok(account.clone())
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut accounts = self.accounts.write();
        let before = accounts.len();
        accounts.retain(|a| a.id != id);
        Ok(accounts.len() < before)
    }

    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.accounts.read().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_account(username: &str, email: &str) -> NewAccount {
        NewAccount {
            username: username.to_string(),
            email: email.to_string(),
            password_hash: "$argon2id$test".to_string(),
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryAccountStore::new();
        assert!(store.is_empty().await.unwrap());

        let created = store.create(new_account("alice", "alice@x.com")).await.unwrap();
        assert!(created.is_active);
        assert!(created.last_login_at.is_none());

        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.username, "alice");
        assert!(!store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_username_case_insensitive() {
        let store = MemoryAccountStore::new();
        store.create(new_account("alice", "alice@x.com")).await.unwrap();

        let err = store.create(new_account("ALICE", "other@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_duplicate_email() {
        let store = MemoryAccountStore::new();
        store.create(new_account("alice", "alice@x.com")).await.unwrap();

        let err = store.create(new_account("bob", "Alice@X.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_find_by_username_skips_inactive() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("alice", "alice@x.com")).await.unwrap();

        assert!(store.find_by_username("alice").await.unwrap().is_some());

        let toggled = store.toggle_status(&created.id).await.unwrap();
        assert!(!toggled.is_active);
        assert!(store.find_by_username("alice").await.unwrap().is_none());

        // Deactivated accounts still block re-registration
        let err = store.create(new_account("alice", "new@x.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate(_)));
    }

    #[tokio::test]
    async fn test_record_login_stamps_timestamp() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("alice", "alice@x.com")).await.unwrap();

        store.record_login(&created.id).await.unwrap();
        let fetched = store.get(&created.id).await.unwrap().unwrap();
        assert!(fetched.last_login_at.is_some());

        let err = store.record_login("missing").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete() {
        let store = MemoryAccountStore::new();
        let created = store.create(new_account("alice", "alice@x.com")).await.unwrap();

        assert!(store.delete(&created.id).await.unwrap());
        assert!(!store.delete(&created.id).await.unwrap());
        assert!(store.get(&created.id).await.unwrap().is_none());
    }
}
