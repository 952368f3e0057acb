use parcel_services::{Storage, UploadLifecycle};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub lifecycle: Arc<UploadLifecycle>,
    pub storage: Arc<dyn Storage>,
}
