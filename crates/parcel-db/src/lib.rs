//! Upload record stores
//!
//! The [`UploadRecordStore`] trait is the only way the lifecycle reads or writes
//! upload metadata. Two implementations are provided: PostgreSQL for deployments and
//! an in-memory store for development and tests.

pub mod memory;
pub mod postgres;
pub mod store;

pub use memory::InMemoryUploadStore;
pub use postgres::FileUploadRepository;
pub use store::{ConditionalUpdate, UploadRecordStore};

use anyhow::Context;
use sqlx::PgPool;
use std::path::Path;

/// Apply pending migrations from the workspace `migrations/` directory
pub async fn run_migrations(pool: &PgPool) -> anyhow::Result<()> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../migrations");
    let migrator = sqlx::migrate::Migrator::new(migrations_dir)
        .await
        .context("Failed to load migrations")?;
    migrator
        .run(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}
