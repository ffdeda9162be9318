//! Store traits and in-memory implementations
//!
//! Handlers only ever see `Arc<dyn AccountStore>` / `Arc<dyn RecordStore>`,
//! so a persistent backend can be swapped in without touching the API layer.

mod accounts;
mod records;

pub use accounts::MemoryAccountStore;
pub use records::MemoryRecordStore;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{
    Account, EmployeeRecord, NewAccount, NewEmployeeRecord, RecordScope, UpdateEmployeeRecord,
};

/// Account storage operations
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a new account
    ///
    /// Username and email uniqueness is case-insensitive and covers
    /// inactive accounts.
    async fn create(&self, account: NewAccount) -> Result<Account, StoreError>;

    /// Get an account by id
    async fn get(&self, id: &str) -> Result<Option<Account>, StoreError>;

    /// Get an active account by username
    ///
    /// Deactivated accounts are treated as absent; login is the only
    /// caller and must not authenticate them.
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;

    /// List all accounts
    async fn list(&self) -> Result<Vec<Account>, StoreError>;

    /// Stamp `last_login_at` after a successful login
    async fn record_login(&self, id: &str) -> Result<(), StoreError>;

    /// Flip `is_active` and return the updated account
    async fn toggle_status(&self, id: &str) -> Result<Account, StoreError>;

    /// Delete an account, returning whether it existed
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Check whether any accounts exist
    async fn is_empty(&self) -> Result<bool, StoreError>;
}

/// Employee record storage operations
///
/// Every read and write takes a [`RecordScope`]; records outside the scope
/// behave as absent rather than forbidden.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// List records visible under the scope, in insertion order
    async fn list(&self, scope: &RecordScope) -> Result<Vec<EmployeeRecord>, StoreError>;

    /// Get a record by id if the scope permits it
    async fn get(&self, id: i64, scope: &RecordScope)
        -> Result<Option<EmployeeRecord>, StoreError>;

    /// Insert a new record, assigning the next sequential id
    async fn create(&self, record: NewEmployeeRecord) -> Result<EmployeeRecord, StoreError>;

    /// Apply a partial update and stamp `updated_at`
    async fn update(
        &self,
        id: i64,
        patch: UpdateEmployeeRecord,
        scope: &RecordScope,
    ) -> Result<EmployeeRecord, StoreError>;

    /// Delete a record, returning whether it existed within the scope
    async fn delete(&self, id: i64, scope: &RecordScope) -> Result<bool, StoreError>;
}
