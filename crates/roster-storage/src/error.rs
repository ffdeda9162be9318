//! Storage error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("No file content provided")]
    EmptyFile,

    #[error("Only PDF files are accepted (got '{0}')")]
    UnsupportedContentType(String),

    #[error("File too large: {size} bytes (max {max})")]
    TooLarge { size: u64, max: u64 },
}
