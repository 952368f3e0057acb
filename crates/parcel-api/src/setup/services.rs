//! Service initialization and application state setup

use anyhow::Result;
use parcel_core::{Config, RecordStoreKind, UploadValidator};
use parcel_services::{
    ExpirySweeper, FileUploadRepository, InMemoryUploadStore, LifecycleSettings, Storage,
    UploadLifecycle, UploadRecordStore,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use crate::state::AppState;

/// Build the configured record store, connecting and migrating PostgreSQL when selected
pub async fn setup_record_store(config: &Config) -> Result<Arc<dyn UploadRecordStore>> {
    match config.record_store {
        RecordStoreKind::Postgres => {
            let pool = super::database::setup_database(config).await?;
            Ok(Arc::new(FileUploadRepository::new(pool)))
        }
        RecordStoreKind::Memory => {
            tracing::warn!("Using in-memory record store - records are lost on restart");
            Ok(Arc::new(InMemoryUploadStore::new()))
        }
    }
}

/// Wire the validator, record store and storage into the lifecycle and return the application state
pub fn initialize_services(
    config: &Config,
    store: Arc<dyn UploadRecordStore>,
    storage: Arc<dyn Storage>,
) -> Arc<AppState> {
    let settings = LifecycleSettings::from_config(config);
    tracing::info!(
        max_file_size_bytes = config.upload_policy.max_file_size_bytes,
        allowed_content_types = %config.upload_policy.allowed_content_types.join(","),
        upload_ttl_secs = settings.upload_ttl.as_secs(),
        verify_on_confirm = settings.verify_on_confirm,
        "Upload lifecycle initialized"
    );

    let lifecycle = Arc::new(UploadLifecycle::new(
        UploadValidator::new(&config.upload_policy),
        store,
        storage.clone(),
        settings,
    ));

    Arc::new(AppState { lifecycle, storage })
}

/// Start the background expiry sweep. Returns `None` when the interval is 0.
pub fn start_expiry_sweeper(config: &Config, state: &AppState) -> Option<JoinHandle<()>> {
    if config.expiry_sweep_interval_secs == 0 {
        tracing::info!("Expiry sweeper disabled");
        return None;
    }

    let sweeper = Arc::new(ExpirySweeper::new(
        state.lifecycle.clone(),
        Duration::from_secs(config.expiry_sweep_interval_secs),
    ));
    tracing::info!(
        interval_secs = config.expiry_sweep_interval_secs,
        batch_size = config.expiry_sweep_batch_size,
        "Expiry sweeper started"
    );
    Some(sweeper.start())
}
