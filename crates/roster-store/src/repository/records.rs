//! Employee record operations

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::models::{EmployeeRecord, NewEmployeeRecord, RecordScope, UpdateEmployeeRecord};
use crate::repository::RecordStore;

/// In-memory employee record store
///
/// Ids come from a counter held inside the write lock, so concurrent
/// creates can never race to the same id and ids are not reused after a
/// delete.
#[derive(Default)]
pub struct MemoryRecordStore {
    inner: RwLock<RecordState>,
}

struct RecordState {
    records: Vec<EmployeeRecord>,
    next_id: i64,
}

impl Default for RecordState {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            next_id: 1,
        }
    }
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn list(&self, scope: &RecordScope) -> Result<Vec<EmployeeRecord>, StoreError> {
        let state = self.inner.read();
        Ok(state
            .records
            .iter()
            .filter(|r| scope.permits(r))
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        id: i64,
        scope: &RecordScope,
    ) -> Result<Option<EmployeeRecord>, StoreError> {
        let state = self.inner.read();
        Ok(state
            .records
            .iter()
            .find(|r| r.id == id && scope.permits(r))
            .cloned())
    }

    async fn create(&self, record: NewEmployeeRecord) -> Result<EmployeeRecord, StoreError> {
        let mut state = self.inner.write();
        let id = state.next_id;
        state.next_id += 1;

        let created = EmployeeRecord {
            id,
            first_name: record.first_name,
            last_name: record.last_name,
            email: record.email,
            owner_account_id: record.owner_account_id,
            date_of_birth: record.date_of_birth,
            place_of_birth: record.place_of_birth,
            residence: record.residence,
            certificate_file_name: record.certificate_file_name,
            created_at: Utc::now(),
            updated_at: None,
        };
        state.records.push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: i64,
        patch: UpdateEmployeeRecord,
        scope: &RecordScope,
    ) -> Result<EmployeeRecord, StoreError> {
        let mut state = self.inner.write();
        let record = state
            .records
            .iter_mut()
            .find(|r| r.id == id && scope.permits(r))
            .ok_or_else(|| StoreError::NotFound(format!("Employee record {} not found", id)))?;

        if let Some(first_name) = patch.first_name {
            record.first_name = first_name;
        }
        if let Some(last_name) = patch.last_name {
            record.last_name = last_name;
        }
        if let Some(email) = patch.email {
            record.email = email;
        }
        if let Some(owner_account_id) = patch.owner_account_id {
            record.owner_account_id = owner_account_id;
        }
        if let Some(date_of_birth) = patch.date_of_birth {
            record.date_of_birth = date_of_birth;
        }
        if let Some(place_of_birth) = patch.place_of_birth {
            record.place_of_birth = place_of_birth;
        }
        if let Some(residence) = patch.residence {
            record.residence = residence;
        }
        if let Some(certificate_file_name) = patch.certificate_file_name {
            record.certificate_file_name = certificate_file_name;
        }
        record.updated_at = Some(Utc::now());

        Ok(record.clone())
    }

    async fn delete(&self, id: i64, scope: &RecordScope) -> Result<bool, StoreError> {
        let mut state = self.inner.write();
        let before = state.records.len();
        state.records.retain(|r| !(r.id == id && scope.permits(r)));
        Ok(state.records.len() < before)
    }
}
