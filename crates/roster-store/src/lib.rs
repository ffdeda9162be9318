//! Roster Data Layer
//!
//! In-memory account and employee-record stores behind async traits, so the
//! API layer depends on the trait objects rather than a concrete backend.

pub mod error;
pub mod models;
pub mod repository;

pub use error::StoreError;
pub use models::*;
pub use repository::{AccountStore, MemoryAccountStore, MemoryRecordStore, RecordStore};
