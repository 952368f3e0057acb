//! Upload lifecycle
//!
//! Owns the record state machine `(none) -> PENDING -> {UPLOADED | REJECTED}`. Every
//! transition is a conditional write on the record store, so several instances can
//! confirm and sweep the same records without coordination.

use chrono::{DateTime, Utc};
use parcel_core::models::{UploadGrant, UploadMetadata, UploadRequest, UploadStatus};
use parcel_core::{AppError, Config, UploadPolicy, UploadValidator, ValidatedRequest};
use parcel_db::{ConditionalUpdate, UploadRecordStore};
use parcel_storage::{generate_upload_key, Storage};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

use crate::clock::{Clock, SystemClock};

/// Knobs for the lifecycle that are not part of request validation
#[derive(Debug, Clone)]
pub struct LifecycleSettings {
    /// Lifetime of a PENDING record and of the grant issued with it
    pub upload_ttl: Duration,
    /// Require the object to exist in blob storage before accepting a confirmation
    pub verify_on_confirm: bool,
    /// Records transitioned per scan during an expiry sweep
    pub sweep_batch_size: i64,
    /// How long terminal records are kept past `expires_at`; `None` keeps them forever
    pub record_retention: Option<Duration>,
}

impl Default for LifecycleSettings {
    fn default() -> Self {
        Self {
            upload_ttl: Duration::from_secs(UploadPolicy::default().url_ttl_seconds),
            verify_on_confirm: true,
            sweep_batch_size: 500,
            record_retention: None,
        }
    }
}

impl LifecycleSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            upload_ttl: Duration::from_secs(config.upload_policy.url_ttl_seconds),
            verify_on_confirm: config.verify_upload_on_confirm,
            sweep_batch_size: config.expiry_sweep_batch_size,
            record_retention: match config.record_retention_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

pub struct UploadLifecycle {
    validator: UploadValidator,
    store: Arc<dyn UploadRecordStore>,
    storage: Arc<dyn Storage>,
    clock: Arc<dyn Clock>,
    settings: LifecycleSettings,
}

impl UploadLifecycle {
    pub fn new(
        validator: UploadValidator,
        store: Arc<dyn UploadRecordStore>,
        storage: Arc<dyn Storage>,
        settings: LifecycleSettings,
    ) -> Self {
        Self::with_clock(validator, store, storage, settings, Arc::new(SystemClock))
    }

    pub fn with_clock(
        validator: UploadValidator,
        store: Arc<dyn UploadRecordStore>,
        storage: Arc<dyn Storage>,
        settings: LifecycleSettings,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            validator,
            store,
            storage,
            clock,
            settings,
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn settings(&self) -> &LifecycleSettings {
        &self.settings
    }

    /// Run the request through the validator. Pure.
    pub fn validate(&self, request: &UploadRequest) -> Result<ValidatedRequest, AppError> {
        Ok(self.validator.validate(request)?)
    }

    /// Create a PENDING record and the grant that lets the client upload it.
    ///
    /// The grant is signed before anything is persisted; if either step fails no
    /// record exists afterwards.
    #[tracing::instrument(skip(self, validated), fields(upload.file_name = %validated.file_name(), upload.size = validated.file_size_bytes()))]
    pub async fn create_upload(
        &self,
        validated: ValidatedRequest,
        user_id: &str,
    ) -> Result<(UploadMetadata, UploadGrant), AppError> {
        let now = self.clock.now();
        let ttl = self.settings.upload_ttl;
        let expires_at = now
            .checked_add_signed(ttl_as_chrono(ttl)?)
            .ok_or_else(|| AppError::Internal(format!("Upload TTL of {:?} is out of range", ttl)))?;

        let file_id = Uuid::new_v4();
        let storage_key = generate_upload_key(user_id, file_id, validated.file_name());

        let upload_url = self
            .storage
            .issue_upload_grant(&storage_key, validated.content_type(), ttl)
            .await?;

        let record = UploadMetadata {
            file_id,
            user_id: user_id.to_string(),
            file_name: validated.file_name().to_string(),
            file_size_bytes: validated.file_size_bytes(),
            storage_key,
            status: UploadStatus::Pending,
            content_type: validated.content_type().to_string(),
            created_at: now,
            updated_at: now,
            expires_at,
        };
        self.store.put(&record).await?;

        tracing::info!(
            file_id = %file_id,
            storage_key = %record.storage_key,
            expires_at = %expires_at,
            "Upload created"
        );

        let grant = UploadGrant {
            file_id,
            upload_url,
            expires_in: ttl.as_secs(),
        };
        Ok((record, grant))
    }

    /// Look up a record. With `user_id`, records owned by someone else are reported as missing.
    pub async fn get_upload(
        &self,
        file_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<UploadMetadata, AppError> {
        let record = self
            .store
            .get(file_id)
            .await?
            .ok_or_else(|| not_found(file_id))?;

        match user_id {
            Some(user_id) if !record.is_owned_by(user_id) => Err(not_found(file_id)),
            _ => Ok(record),
        }
    }

    /// Move a PENDING record to UPLOADED.
    ///
    /// An expired record is rejected on the spot instead, and the call fails.
    #[tracing::instrument(skip(self), fields(upload.file_id = %file_id))]
    pub async fn confirm_upload(
        &self,
        file_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<UploadMetadata, AppError> {
        let record = self.get_upload(file_id, user_id).await?;
        ensure_pending(&record)?;

        let now = self.clock.now();
        if record.is_expired(now) {
            self.reject_expired(&record, now).await?;
            return Err(AppError::InvalidState(format!(
                "Upload {} expired at {}",
                file_id, record.expires_at
            )));
        }

        if self.settings.verify_on_confirm && !self.storage.exists(&record.storage_key).await? {
            return Err(AppError::InvalidState(format!(
                "Upload {} has not been received by storage",
                file_id
            )));
        }

        match self
            .store
            .conditional_update_status(file_id, UploadStatus::Pending, UploadStatus::Uploaded, now)
            .await?
        {
            ConditionalUpdate::Applied(updated) => {
                tracing::info!(file_id = %file_id, "Upload confirmed");
                Ok(updated)
            }
            ConditionalUpdate::ConditionFailed => {
                // Lost a race; report what the winner left behind
                let current = self.get_upload(file_id, None).await?;
                Err(already_terminal(&current))
            }
        }
    }

    /// Issue a fresh grant for a PENDING record. The record is never modified unless it
    /// turns out to be expired, in which case it is rejected.
    #[tracing::instrument(skip(self), fields(upload.file_id = %file_id))]
    pub async fn reissue_grant(
        &self,
        file_id: Uuid,
        user_id: Option<&str>,
    ) -> Result<UploadGrant, AppError> {
        let record = self.get_upload(file_id, user_id).await?;
        ensure_pending(&record)?;

        let now = self.clock.now();
        if record.is_expired(now) {
            self.reject_expired(&record, now).await?;
            return Err(AppError::InvalidState(format!(
                "Upload {} expired at {}",
                file_id, record.expires_at
            )));
        }

        // A grant must not outlive its record, and a record is not rejected before expires_at
        let remaining = record.seconds_remaining(now);
        if remaining == 0 {
            return Err(AppError::InvalidState(format!(
                "Upload {} expires in under a second; confirm it or start a new upload",
                file_id
            )));
        }

        let upload_url = self
            .storage
            .issue_upload_grant(
                &record.storage_key,
                &record.content_type,
                Duration::from_secs(remaining),
            )
            .await?;

        Ok(UploadGrant {
            file_id,
            upload_url,
            expires_in: remaining,
        })
    }

    /// Reject every PENDING record whose `expires_at <= now`. Returns how many
    /// transitions this call applied; records another sweeper got to first are not counted.
    #[tracing::instrument(skip(self))]
    pub async fn expire_stale_pending(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let batch_size = self.settings.sweep_batch_size.max(1);
        let mut expired = 0u64;

        loop {
            let batch = self
                .store
                .scan_by_status_and_expiry(UploadStatus::Pending, now, batch_size)
                .await?;
            let scanned = batch.len();

            for record in batch {
                if let ConditionalUpdate::Applied(_) = self
                    .store
                    .conditional_update_status(
                        record.file_id,
                        UploadStatus::Pending,
                        UploadStatus::Rejected,
                        now,
                    )
                    .await?
                {
                    expired += 1;
                    tracing::debug!(file_id = %record.file_id, "Expired pending upload");
                }
            }

            // Every scanned record left PENDING, so the next scan only sees new work
            if (scanned as i64) < batch_size {
                break;
            }
        }

        if expired > 0 {
            tracing::info!(expired, "Expired stale pending uploads");
        }
        Ok(expired)
    }

    /// Delete terminal records older than the retention window. No-op when retention is off.
    #[tracing::instrument(skip(self))]
    pub async fn purge_retained(&self, now: DateTime<Utc>) -> Result<u64, AppError> {
        let Some(retention) = self.settings.record_retention else {
            return Ok(0);
        };

        let cutoff = now
            .checked_sub_signed(ttl_as_chrono(retention)?)
            .ok_or_else(|| {
                AppError::Internal(format!("Record retention of {:?} is out of range", retention))
            })?;
        let purged = self.store.purge_terminal_before(cutoff).await?;

        if purged > 0 {
            tracing::info!(purged, cutoff = %cutoff, "Purged retained upload records");
        }
        Ok(purged)
    }

    pub async fn health_check(&self) -> Result<(), AppError> {
        self.store.health_check().await
    }

    async fn reject_expired(&self, record: &UploadMetadata, now: DateTime<Utc>) -> Result<(), AppError> {
        let outcome = self
            .store
            .conditional_update_status(
                record.file_id,
                UploadStatus::Pending,
                UploadStatus::Rejected,
                now,
            )
            .await?;

        if let ConditionalUpdate::Applied(_) = outcome {
            tracing::info!(file_id = %record.file_id, "Rejected expired upload");
        }
        Ok(())
    }
}

fn ttl_as_chrono(ttl: Duration) -> Result<chrono::Duration, AppError> {
    chrono::Duration::from_std(ttl)
        .map_err(|e| AppError::Internal(format!("Duration out of range: {}", e)))
}

fn not_found(file_id: Uuid) -> AppError {
    AppError::NotFound(format!("Upload {} not found", file_id))
}

fn ensure_pending(record: &UploadMetadata) -> Result<(), AppError> {
    if record.status.is_terminal() {
        return Err(already_terminal(record));
    }
    Ok(())
}

fn already_terminal(record: &UploadMetadata) -> AppError {
    AppError::InvalidState(format!(
        "Upload {} is already {}",
        record.file_id, record.status
    ))
}
