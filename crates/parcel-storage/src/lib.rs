//! Parcel Storage Library
//!
//! This crate provides the blob-storage abstraction used by the upload lifecycle and
//! its S3 and local filesystem implementations. The lifecycle never moves file bytes
//! itself: it asks a backend for a time-limited upload URL and later checks whether
//! the object arrived.
//!
//! # Storage key format
//!
//! `uploads/{urlencoded user_id}/{file_id}.{ext}`. Key generation lives in the `keys`
//! module so every backend and the lifecycle agree on it.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_upload_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use parcel_core::StorageBackend;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
