use chrono::{DateTime, Utc};
use parcel_core::models::{UploadMetadata, UploadStatus};
use parcel_core::AppError;
use uuid::Uuid;

/// Outcome of a compare-and-swap status write
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConditionalUpdate {
    /// The record was in the expected state and now carries the new one
    Applied(UploadMetadata),
    /// The record is missing or was not in the expected state; nothing was written
    ConditionFailed,
}

/// Trait for upload record store operations
///
/// Every status transition goes through [`conditional_update_status`], so concurrent
/// writers across instances cannot both win the same transition.
///
/// [`conditional_update_status`]: UploadRecordStore::conditional_update_status
#[async_trait::async_trait]
pub trait UploadRecordStore: Send + Sync {
    /// Insert a new record. Fails if a record with the same `file_id` exists.
    async fn put(&self, record: &UploadMetadata) -> Result<(), AppError>;

    async fn get(&self, file_id: Uuid) -> Result<Option<UploadMetadata>, AppError>;

    /// Set `status = to` and `updated_at = at` only if the current status is `from`.
    async fn conditional_update_status(
        &self,
        file_id: Uuid,
        from: UploadStatus,
        to: UploadStatus,
        at: DateTime<Utc>,
    ) -> Result<ConditionalUpdate, AppError>;

    /// Records in `status` whose `expires_at <= before`, oldest first, at most `limit`.
    async fn scan_by_status_and_expiry(
        &self,
        status: UploadStatus,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UploadMetadata>, AppError>;

    /// Delete terminal records whose `expires_at <= before`. Returns how many were removed.
    async fn purge_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, AppError>;

    async fn health_check(&self) -> Result<(), AppError>;
}
