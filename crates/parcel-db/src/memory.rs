use chrono::{DateTime, Utc};
use parcel_core::models::{UploadMetadata, UploadStatus};
use parcel_core::AppError;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::store::{ConditionalUpdate, UploadRecordStore};

/// Process-local record store.
///
/// Each operation holds the lock for its whole read-check-write, which gives the same
/// conditional-write guarantee as the database store within one process.
#[derive(Clone, Default)]
pub struct InMemoryUploadStore {
    records: Arc<RwLock<HashMap<Uuid, UploadMetadata>>>,
}

impl InMemoryUploadStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait::async_trait]
impl UploadRecordStore for InMemoryUploadStore {
    async fn put(&self, record: &UploadMetadata) -> Result<(), AppError> {
        let mut records = self.records.write().await;
        if records.contains_key(&record.file_id) {
            return Err(AppError::Storage(format!(
                "Upload {} already exists",
                record.file_id
            )));
        }
        records.insert(record.file_id, record.clone());
        Ok(())
    }

    async fn get(&self, file_id: Uuid) -> Result<Option<UploadMetadata>, AppError> {
        Ok(self.records.read().await.get(&file_id).cloned())
    }

    async fn conditional_update_status(
        &self,
        file_id: Uuid,
        from: UploadStatus,
        to: UploadStatus,
        at: DateTime<Utc>,
    ) -> Result<ConditionalUpdate, AppError> {
        let mut records = self.records.write().await;
        match records.get_mut(&file_id) {
            Some(record) if record.status == from => {
                record.status = to;
                record.updated_at = at;
                Ok(ConditionalUpdate::Applied(record.clone()))
            }
            _ => Ok(ConditionalUpdate::ConditionFailed),
        }
    }

    async fn scan_by_status_and_expiry(
        &self,
        status: UploadStatus,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UploadMetadata>, AppError> {
        let records = self.records.read().await;
        let mut matching: Vec<UploadMetadata> = records
            .values()
            .filter(|r| r.status == status && r.expires_at <= before)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.expires_at);
        matching.truncate(limit.max(0) as usize);
        Ok(matching)
    }

    async fn purge_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, AppError> {
        let mut records = self.records.write().await;
        let initial = records.len();
        records.retain(|_, r| !(r.status.is_terminal() && r.expires_at <= before));
        Ok((initial - records.len()) as u64)
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}
