//! Application setup and initialization
//!
//! Everything main.rs needs to go from a `Config` to a served router, split up so the
//! integration tests can assemble the same pieces with in-process backends.

pub mod database;
pub mod routes;
pub mod server;
pub mod services;
pub mod storage;

use crate::state::AppState;
use anyhow::Result;
use parcel_core::Config;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Initialize the entire application.
///
/// Returns the sweeper handle (when the sweep is enabled) so the caller can stop it on shutdown.
pub async fn initialize_app(
    config: Config,
) -> Result<(Arc<AppState>, axum::Router, Option<JoinHandle<()>>)> {
    crate::telemetry::init_telemetry(&config.log_format)?;

    tracing::info!(
        environment = %config.environment,
        record_store = ?config.record_store,
        storage_backend = %config.storage_backend,
        "Configuration loaded and validated successfully"
    );

    let store = services::setup_record_store(&config).await?;

    let storage = storage::setup_storage(&config).await?;

    let state = services::initialize_services(&config, store, storage);

    let sweeper = services::start_expiry_sweeper(&config, &state);

    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router, sweeper))
}
