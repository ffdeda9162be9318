//! In-memory file store

use async_trait::async_trait;
use bytes::Bytes;
use chrono::Utc;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;
use uuid::Uuid;

use crate::backend::{
    compute_sha256, FileStore, NewFile, StoredFile, UploadOutcome, MAX_FILE_SIZE, PDF_CONTENT_TYPE,
};
use crate::error::StorageError;

#[derive(Default)]
struct Inner {
    contents: HashMap<String, Bytes>,
    metadata: HashMap<String, StoredFile>,
}

/// In-memory file store
///
/// Payloads and metadata live in two maps keyed by the generated file
/// name, kept in step under a single lock.
#[derive(Default)]
pub struct MemoryFileStore {
    inner: RwLock<Inner>,
}

impl MemoryFileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Generated names compose owner, UTC timestamp and a random component,
/// so they never collide: `{owner}_{yyyyMMddHHmmss}_{uuid}{ext}`.
fn generate_file_name(owner_account_id: &str, original_name: &str) -> String {
    let extension = Path::new(original_name)
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    format!(
        "{}_{}_{}{}",
        owner_account_id,
        Utc::now().format("%Y%m%d%H%M%S"),
        Uuid::new_v4().simple(),
        extension
    )
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn store(&self, file: NewFile) -> Result<UploadOutcome, StorageError> {
        // All validation happens before the payload is hashed
        let size = file.data.len() as u64;
        if size == 0 {
            return Err(StorageError::EmptyFile);
        }
        if file.content_type != PDF_CONTENT_TYPE {
            return Err(StorageError::UnsupportedContentType(file.content_type));
        }
        if size > MAX_FILE_SIZE {
            return Err(StorageError::TooLarge {
                size,
                max: MAX_FILE_SIZE,
            });
        }

        let sha256 = compute_sha256(&file.data);

        let mut inner = self.inner.write();
        if let Some(existing) = inner.metadata.values().find(|f| f.sha256 == sha256) {
            debug!(
                file_name = %existing.file_name,
                "Upload deduplicated against existing content"
            );
            return Ok(UploadOutcome {
                file_name: existing.file_name.clone(),
                original_name: file.original_name,
                size,
                sha256,
                duplicate: true,
            });
        }

        let file_name = generate_file_name(&file.owner_account_id, &file.original_name);
        let stored = StoredFile {
            file_name: file_name.clone(),
            original_name: file.original_name.clone(),
            size,
            content_type: file.content_type,
            sha256: sha256.clone(),
            uploaded_at: Utc::now(),
            owner_account_id: file.owner_account_id,
        };
        inner.contents.insert(file_name.clone(), file.data);
        inner.metadata.insert(file_name.clone(), stored);
        debug!(file_name = %file_name, size, "Stored new file");

        Ok(UploadOutcome {
            file_name,
            original_name: file.original_name,
            size,
            sha256,
            duplicate: false,
        })
    }

    async fn retrieve(
        &self,
        file_name: &str,
    ) -> Result<Option<(Bytes, StoredFile)>, StorageError> {
        let inner = self.inner.read();
        let content = inner.contents.get(file_name).cloned();
        let metadata = inner.metadata.get(file_name).cloned();
        Ok(content.zip(metadata))
    }

    async fn metadata(&self, file_name: &str) -> Result<Option<StoredFile>, StorageError> {
        Ok(self.inner.read().metadata.get(file_name).cloned())
    }

    async fn delete(&self, file_name: &str) -> Result<bool, StorageError> {
        let mut inner = self.inner.write();
        let removed = inner.contents.remove(file_name).is_some();
        inner.metadata.remove(file_name);
        if removed {
            debug!(file_name = %file_name, "Deleted file");
        }
        Ok(removed)
    }

    async fn list_for_owner(
        &self,
        owner_account_id: &str,
    ) -> Result<Vec<StoredFile>, StorageError> {
        let inner = self.inner.read();
        let mut files: Vec<StoredFile> = inner
            .metadata
            .values()
            .filter(|f| f.owner_account_id == owner_account_id)
            .cloned()
            .collect();
        files.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        Ok(files)
    }

    async fn list_all(&self) -> Result<Vec<StoredFile>, StorageError> {
        let inner = self.inner.read();
        let mut files: Vec<StoredFile> = inner.metadata.values().cloned().collect();
        files.sort_by(|a, b| a.uploaded_at.cmp(&b.uploaded_at));
        Ok(files)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pdf(name: &str, data: &'static [u8], owner: &str) -> NewFile {
        NewFile {
            original_name: name.to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            data: Bytes::from_static(data),
            owner_account_id: owner.to_string(),
        }
    }

    #[tokio::test]
    async fn test_store_and_retrieve() {
        let store = MemoryFileStore::new();
        let outcome = store.store(pdf("cert.pdf", b"%PDF-1.4 payload", "o1")).await.unwrap();
        assert!(!outcome.duplicate);
        assert!(outcome.file_name.starts_with("o1_"));
        assert!(outcome.file_name.ends_with(".pdf"));

        let (data, meta) = store.retrieve(&outcome.file_name).await.unwrap().unwrap();
        assert_eq!(&data[..], b"%PDF-1.4 payload");
        assert_eq!(meta.original_name, "cert.pdf");
        assert_eq!(meta.content_type, PDF_CONTENT_TYPE);
        assert_eq!(meta.owner_account_id, "o1");
    }

    #[tokio::test]
    async fn test_duplicate_content_is_deduplicated() {
        let store = MemoryFileStore::new();
        let first = store.store(pdf("a.pdf", b"%PDF same bytes", "o1")).await.unwrap();
        let second = store.store(pdf("b.pdf", b"%PDF same bytes", "o2")).await.unwrap();

        assert!(second.duplicate);
        assert_eq!(second.file_name, first.file_name);
        assert_eq!(second.original_name, "b.pdf");
        assert_eq!(second.sha256, first.sha256);

        // Only one copy of the bytes is kept
        assert_eq!(store.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_distinct_content_same_name_stored_separately() {
        let store = MemoryFileStore::new();
        let first = store.store(pdf("cert.pdf", b"%PDF one", "o1")).await.unwrap();
        let second = store.store(pdf("cert.pdf", b"%PDF two", "o1")).await.unwrap();

        assert!(!second.duplicate);
        assert_ne!(first.file_name, second.file_name);
        assert_eq!(store.list_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_non_pdf() {
        let store = MemoryFileStore::new();
        let file = NewFile {
            original_name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            data: Bytes::from_static(b"not a pdf"),
            owner_account_id: "o1".to_string(),
        };
        let err = store.store(file).await.unwrap_err();
        assert!(matches!(err, StorageError::UnsupportedContentType(_)));
    }

    #[tokio::test]
    async fn test_rejects_empty() {
        let store = MemoryFileStore::new();
        let err = store.store(pdf("cert.pdf", b"", "o1")).await.unwrap_err();
        assert!(matches!(err, StorageError::EmptyFile));
    }

    #[tokio::test]
    async fn test_rejects_oversized() {
        let store = MemoryFileStore::new();
        let file = NewFile {
            original_name: "big.pdf".to_string(),
            content_type: PDF_CONTENT_TYPE.to_string(),
            data: Bytes::from(vec![0u8; (MAX_FILE_SIZE + 1) as usize]),
            owner_account_id: "o1".to_string(),
        };
        let err = store.store(file).await.unwrap_err();
        assert!(matches!(err, StorageError::TooLarge { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_content_and_metadata() {
        let store = MemoryFileStore::new();
        let outcome = store.store(pdf("cert.pdf", b"%PDF data", "o1")).await.unwrap();

        assert!(store.delete(&outcome.file_name).await.unwrap());
        assert!(!store.delete(&outcome.file_name).await.unwrap());
        assert!(store.retrieve(&outcome.file_name).await.unwrap().is_none());
        assert!(store.metadata(&outcome.file_name).await.unwrap().is_none());

        // With the metadata gone the hash no longer deduplicates
        let again = store.store(pdf("cert.pdf", b"%PDF data", "o1")).await.unwrap();
        assert!(!again.duplicate);
    }

    #[tokio::test]
    async fn test_list_for_owner() {
        let store = MemoryFileStore::new();
        store.store(pdf("a.pdf", b"%PDF a", "o1")).await.unwrap();
        store.store(pdf("b.pdf", b"%PDF b", "o2")).await.unwrap();
        store.store(pdf("c.pdf", b"%PDF c", "o1")).await.unwrap();

        let own = store.list_for_owner("o1").await.unwrap();
        assert_eq!(own.len(), 2);
        assert!(own.iter().all(|f| f.owner_account_id == "o1"));
        assert_eq!(store.list_all().await.unwrap().len(), 3);
    }
}
