//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p parcel-api --test uploads_test` or
//! `cargo test -p parcel-api`. Uses the in-memory record store and local storage, so no
//! external services are needed.
#![allow(dead_code)]

use axum_test::TestServer;
use chrono::Utc;
use parcel_api::constants;
use parcel_api::setup::routes;
use parcel_api::state::AppState;
use parcel_core::{Config, UploadValidator};
use parcel_services::{
    InMemoryUploadStore, LifecycleSettings, LocalStorage, ManualClock, UploadLifecycle,
};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

pub const TEST_USER: &str = "user-1";
pub const OTHER_USER: &str = "user-2";

/// API path prefix for tests (e.g. `/api/v1`).
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server, clock, and owned resources.
pub struct TestApp {
    pub server: TestServer,
    pub clock: Arc<ManualClock>,
    pub store: InMemoryUploadStore,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn storage_root(&self) -> &Path {
        self._temp_dir.path()
    }

    /// Simulate the client's direct PUT by writing the object where local storage expects it
    pub async fn put_object(&self, storage_key: &str) {
        let path = self.storage_root().join(storage_key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.unwrap();
        }
        tokio::fs::write(&path, b"%PDF-1.7").await.unwrap();
    }
}

fn test_config(temp_dir: &TempDir, verify_on_confirm: bool) -> Config {
    let mut vars = HashMap::new();
    vars.insert("ENVIRONMENT", "test".to_string());
    vars.insert("RECORD_STORE", "memory".to_string());
    vars.insert("STORAGE_BACKEND", "local".to_string());
    vars.insert(
        "LOCAL_STORAGE_PATH",
        temp_dir.path().to_string_lossy().to_string(),
    );
    vars.insert(
        "LOCAL_STORAGE_BASE_URL",
        "http://localhost:4000/files".to_string(),
    );
    vars.insert("VERIFY_UPLOAD_ON_CONFIRM", verify_on_confirm.to_string());
    vars.insert("EXPIRY_SWEEP_INTERVAL_SECS", "0".to_string());

    let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();
    config.validate().unwrap();
    config
}

/// Setup test app that checks storage on confirm.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(true).await
}

/// Setup test app with an isolated store, local storage on a temp dir, and a manual clock.
pub async fn setup_test_app_with(verify_on_confirm: bool) -> TestApp {
    let temp_dir = TempDir::new().unwrap();
    let config = test_config(&temp_dir, verify_on_confirm);

    let storage = Arc::new(
        LocalStorage::new(temp_dir.path(), "http://localhost:4000/files".to_string())
            .await
            .unwrap(),
    );
    let store = InMemoryUploadStore::new();
    let clock = Arc::new(ManualClock::new(Utc::now()));

    let lifecycle = Arc::new(UploadLifecycle::with_clock(
        UploadValidator::new(&config.upload_policy),
        Arc::new(store.clone()),
        storage.clone(),
        LifecycleSettings::from_config(&config),
        clock.clone(),
    ));

    let state = Arc::new(AppState { lifecycle, storage });

    let app = routes::setup_routes(&config, state).unwrap();
    let server =
        TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp {
        server,
        clock,
        store,
        _temp_dir: temp_dir,
    }
}
