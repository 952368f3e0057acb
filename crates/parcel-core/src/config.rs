//! Configuration module
//!
//! This module provides the service configuration: HTTP server, record store, blob
//! storage, the upload policy (size, content types, TTL) and the expiry sweep.
//! Every value can be overridden from the environment; `.env` files are honoured.

use std::env;
use std::str::FromStr;

use crate::constants::{
    CONTENT_TYPE_PDF, MAX_FILE_SIZE_BYTES, MAX_PRESIGNED_URL_TTL_SECONDS, PRESIGNED_URL_TTL_SECONDS,
};
use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 4000;
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const EXPIRY_SWEEP_INTERVAL_SECS: u64 = 60;
const EXPIRY_SWEEP_BATCH_SIZE: i64 = 500;
const HTTP_CONCURRENCY_LIMIT: usize = 10_000;

/// Which record store backs the upload metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordStoreKind {
    Postgres,
    /// Process-local store; records vanish on restart. Development and tests only.
    Memory,
}

impl FromStr for RecordStoreKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(RecordStoreKind::Postgres),
            "memory" => Ok(RecordStoreKind::Memory),
            _ => Err(anyhow::anyhow!("Invalid record store: {}", s)),
        }
    }
}

/// Domain constraints applied to every upload request.
///
/// Kept separate from [`Config`] so the validator and the lifecycle manager can be built
/// with any policy without reading the environment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UploadPolicy {
    pub max_file_size_bytes: i64,
    pub allowed_content_types: Vec<String>,
    pub url_ttl_seconds: u64,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_file_size_bytes: MAX_FILE_SIZE_BYTES,
            allowed_content_types: vec![CONTENT_TYPE_PDF.to_string()],
            url_ttl_seconds: PRESIGNED_URL_TTL_SECONDS,
        }
    }
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    /// Upper bound on in-flight HTTP requests
    pub http_concurrency_limit: usize,
    // Record store
    pub record_store: RecordStoreKind,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
    // Blob storage
    pub storage_backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload lifecycle
    pub upload_policy: UploadPolicy,
    pub verify_upload_on_confirm: bool,
    /// Interval in seconds between expiry sweeps. 0 = disabled.
    pub expiry_sweep_interval_secs: u64,
    pub expiry_sweep_batch_size: i64,
    /// How long terminal records are kept after they expire. 0 = keep forever.
    pub record_retention_secs: u64,
    pub log_format: String,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        let config = Self::from_lookup(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Build a configuration from an arbitrary key lookup. Does not validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = lookup("ENVIRONMENT")
            .or_else(|| lookup("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let record_store = match lookup("RECORD_STORE") {
            Some(value) => value.parse()?,
            None => RecordStoreKind::Postgres,
        };

        let storage_backend = match lookup("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::S3,
        };

        let allowed_content_types: Vec<String> = lookup("ALLOWED_CONTENT_TYPES")
            .unwrap_or_else(|| CONTENT_TYPE_PDF.to_string())
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();

        let upload_policy = UploadPolicy {
            max_file_size_bytes: lookup("MAX_FILE_SIZE_BYTES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FILE_SIZE_BYTES),
            allowed_content_types,
            url_ttl_seconds: lookup("UPLOAD_URL_TTL_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(PRESIGNED_URL_TTL_SECONDS),
        };

        Ok(Config {
            server_port: lookup("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            cors_origins,
            http_concurrency_limit: lookup("HTTP_CONCURRENCY_LIMIT")
                .and_then(|s| s.parse::<usize>().ok())
                .unwrap_or(HTTP_CONCURRENCY_LIMIT)
                .max(1),
            record_store,
            database_url: lookup("DATABASE_URL").filter(|s| !s.is_empty()),
            db_max_connections: lookup("DB_MAX_CONNECTIONS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: lookup("DB_TIMEOUT_SECONDS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            storage_backend,
            s3_bucket: lookup("S3_BUCKET"),
            s3_region: lookup("S3_REGION").or_else(|| lookup("AWS_REGION")),
            s3_endpoint: lookup("S3_ENDPOINT"),
            local_storage_path: lookup("LOCAL_STORAGE_PATH"),
            local_storage_base_url: lookup("LOCAL_STORAGE_BASE_URL"),
            upload_policy,
            verify_upload_on_confirm: lookup("VERIFY_UPLOAD_ON_CONFIRM")
                .unwrap_or_else(|| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            expiry_sweep_interval_secs: lookup("EXPIRY_SWEEP_INTERVAL_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(EXPIRY_SWEEP_INTERVAL_SECS),
            expiry_sweep_batch_size: lookup("EXPIRY_SWEEP_BATCH_SIZE")
                .and_then(|s| s.parse().ok())
                .unwrap_or(EXPIRY_SWEEP_BATCH_SIZE),
            record_retention_secs: lookup("RECORD_RETENTION_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(0),
            log_format: lookup("LOG_FORMAT")
                .unwrap_or_else(|| "compact".to_string())
                .to_lowercase(),
        })
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if self.upload_policy.max_file_size_bytes <= 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_BYTES must be positive"));
        }

        if self.upload_policy.allowed_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "ALLOWED_CONTENT_TYPES must list at least one content type"
            ));
        }

        if self.upload_policy.url_ttl_seconds == 0 {
            return Err(anyhow::anyhow!("UPLOAD_URL_TTL_SECONDS must be positive"));
        }

        if self.upload_policy.url_ttl_seconds > MAX_PRESIGNED_URL_TTL_SECONDS {
            return Err(anyhow::anyhow!(
                "UPLOAD_URL_TTL_SECONDS must be at most {} (7 days)",
                MAX_PRESIGNED_URL_TTL_SECONDS
            ));
        }

        if self.expiry_sweep_batch_size <= 0 {
            return Err(anyhow::anyhow!("EXPIRY_SWEEP_BATCH_SIZE must be positive"));
        }

        match self.record_store {
            RecordStoreKind::Postgres => match self.database_url.as_deref() {
                Some(url) if url.starts_with("postgres://") || url.starts_with("postgresql://") => {}
                Some(_) => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be a valid PostgreSQL connection string"
                    ))
                }
                None => {
                    return Err(anyhow::anyhow!(
                        "DATABASE_URL must be set when RECORD_STORE=postgres"
                    ))
                }
            },
            RecordStoreKind::Memory => {
                if self.is_production() {
                    return Err(anyhow::anyhow!(
                        "RECORD_STORE=memory is not allowed in production"
                    ));
                }
            }
        }

        // Validate storage backend configuration
        match self.storage_backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}
