//! Parcel Services Layer
//!
//! This crate is the business service layer: the upload lifecycle state machine and
//! the background expiry sweeper. It re-exports the store and storage types the API
//! needs so the API crate depends on a single service facade. Keep thin HTTP handling
//! in parcel-api.

pub mod clock;
pub mod lifecycle;
pub mod sweeper;

pub use clock::{Clock, ManualClock, SystemClock};
pub use lifecycle::{LifecycleSettings, UploadLifecycle};
pub use sweeper::ExpirySweeper;

pub use parcel_db::{
    ConditionalUpdate, FileUploadRepository, InMemoryUploadStore, UploadRecordStore,
};
pub use parcel_storage::{
    create_storage, generate_upload_key, LocalStorage, S3Storage, Storage, StorageBackend,
    StorageError, StorageResult,
};
