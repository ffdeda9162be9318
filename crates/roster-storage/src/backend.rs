//! File store trait

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::StorageError;

/// The only content type accepted for certificate uploads
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Upload size cap in bytes (10 MiB)
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Metadata kept for every stored file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredFile {
    /// Generated storage name, unique across the store
    pub file_name: String,
    /// Name the client uploaded the file under
    pub original_name: String,
    pub size: u64,
    pub content_type: String,
    /// Lowercase hex SHA256 of the payload
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
    pub owner_account_id: String,
}

/// Incoming upload (for insertion)
#[derive(Debug, Clone)]
pub struct NewFile {
    pub original_name: String,
    pub content_type: String,
    pub data: Bytes,
    pub owner_account_id: String,
}

/// Result of a store call
///
/// On a duplicate, `file_name` is the name the content was first stored
/// under while `original_name` and `size` describe the rejected upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub file_name: String,
    pub original_name: String,
    pub size: u64,
    pub sha256: String,
    pub duplicate: bool,
}

/// Certificate file store
///
/// Content-addressed: the SHA256 of the payload, never the client-supplied
/// name or declared type, decides whether an upload already exists.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Validate and store an upload, deduplicating by content hash
    ///
    /// Validation (PDF only, non-empty, within [`MAX_FILE_SIZE`]) runs
    /// before any hash is computed.
    async fn store(&self, file: NewFile) -> Result<UploadOutcome, StorageError>;

    /// Read a file fully into memory together with its metadata
    async fn retrieve(&self, file_name: &str)
        -> Result<Option<(Bytes, StoredFile)>, StorageError>;

    /// Get metadata without the payload
    async fn metadata(&self, file_name: &str) -> Result<Option<StoredFile>, StorageError>;

    /// Delete a file and its metadata, returning whether it existed
    async fn delete(&self, file_name: &str) -> Result<bool, StorageError>;

    /// List metadata for one owner's files
    async fn list_for_owner(&self, owner_account_id: &str)
        -> Result<Vec<StoredFile>, StorageError>;

    /// List metadata for every stored file
    async fn list_all(&self) -> Result<Vec<StoredFile>, StorageError>;
}

/// Compute the SHA256 hash of data as lowercase hex
pub fn compute_sha256(data: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
