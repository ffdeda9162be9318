//! Roster Certificate Storage
//!
//! Content-addressed storage for PDF certificates: uploads are validated,
//! hashed with SHA256 and deduplicated by content, never by name.

pub mod backend;
pub mod error;
pub mod memory;

pub use backend::{
    compute_sha256, FileStore, NewFile, StoredFile, UploadOutcome, MAX_FILE_SIZE, PDF_CONTENT_TYPE,
};
pub use error::StorageError;
pub use memory::MemoryFileStore;
