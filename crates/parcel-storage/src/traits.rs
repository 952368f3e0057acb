//! Storage abstraction trait
//!
//! This module defines the Storage trait that all blob-storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload grant failed: {0}")]
    GrantFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Blob storage abstraction
///
/// Backends only authorize and observe uploads; the client moves the bytes itself.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Issue a time-limited URL that authorizes one direct PUT to `storage_key`.
    ///
    /// Issuing a grant has no side effect on the store, so it can be retried or
    /// re-issued freely.
    async fn issue_upload_grant(
        &self,
        storage_key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String>;

    /// Check if an object exists at `storage_key`
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

impl From<StorageError> for parcel_core::AppError {
    fn from(err: StorageError) -> Self {
        parcel_core::AppError::Storage(err.to_string())
    }
}
