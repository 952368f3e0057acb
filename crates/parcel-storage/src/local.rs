use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;

/// Local filesystem storage implementation
///
/// Grant URLs point at `base_url`; whatever serves that URL is expected to write
/// into `base_path`. Intended for development and tests.
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for uploaded objects (e.g., "/var/lib/parcel/uploads")
    /// * `base_url` - Base URL clients upload to (e.g., "http://localhost:4000/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Root directory objects are stored under
    pub fn base_path(&self) -> &std::path::Path {
        &self.base_path
    }

    /// Convert storage key to filesystem path, rejecting keys that could escape
    /// the base directory.
    pub fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if storage_key.is_empty() || storage_key.contains("..") || storage_key.starts_with('/') {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }

        let path = self.base_path.join(storage_key);
        if path.strip_prefix(&self.base_path).is_err() {
            return Err(StorageError::InvalidKey(
                "Storage key resolves outside storage directory".to_string(),
            ));
        }

        Ok(path)
    }

    fn generate_url(&self, key: &str, expires_in: Duration) -> String {
        format!(
            "{}/{}?expires_in={}",
            self.base_url.trim_end_matches('/'),
            key,
            expires_in.as_secs()
        )
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn issue_upload_grant(
        &self,
        storage_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> StorageResult<String> {
        self.key_to_path(storage_key)?;
        let url = self.generate_url(storage_key, expires_in);

        tracing::debug!(key = %storage_key, "Issued local upload URL");

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    async fn storage() -> (TempDir, LocalStorage) {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(dir.path(), "http://localhost:4000/files/".to_string())
            .await
            .unwrap();
        (dir, storage)
    }

    #[tokio::test]
    async fn test_grant_url_points_at_key() {
        let (_dir, storage) = storage().await;
        let url = storage
            .issue_upload_grant(
                "uploads/u/abc.pdf",
                "application/pdf",
                Duration::from_secs(300),
            )
            .await
            .unwrap();
        assert_eq!(
            url,
            "http://localhost:4000/files/uploads/u/abc.pdf?expires_in=300"
        );
    }

    #[tokio::test]
    async fn test_grant_has_no_side_effect() {
        let (_dir, storage) = storage().await;
        storage
            .issue_upload_grant("uploads/u/abc.pdf", "application/pdf", Duration::from_secs(5))
            .await
            .unwrap();
        assert!(!storage.exists("uploads/u/abc.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_after_write() {
        let (_dir, storage) = storage().await;
        let path = storage.key_to_path("uploads/u/abc.pdf").unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, b"%PDF-1.7").unwrap();

        assert!(storage.exists("uploads/u/abc.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_rejects_traversal_keys() {
        let (_dir, storage) = storage().await;
        assert!(matches!(
            storage.exists("../etc/passwd").await,
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            storage
                .issue_upload_grant("/abs.pdf", "application/pdf", Duration::from_secs(5))
                .await,
            Err(StorageError::InvalidKey(_))
        ));
        assert_eq!(storage.backend_type(), StorageBackend::Local);
    }
}
