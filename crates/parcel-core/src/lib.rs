//! Parcel Core Library
//!
//! This crate provides the upload domain models, error types, configuration, and the
//! request validator shared across all Parcel components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, RecordStoreKind, UploadPolicy};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackend;
pub use validation::{UploadValidator, ValidatedRequest, ValidationError};
// Note: Storage, StorageError, StorageResult live in the parcel-storage crate
