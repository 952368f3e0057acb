use chrono::{DateTime, Utc};
use parcel_core::models::{UploadMetadata, UploadStatus};
use parcel_core::AppError;
use sqlx::PgPool;
use uuid::Uuid;

use crate::store::{ConditionalUpdate, UploadRecordStore};

const SELECT_COLUMNS: &str = r#"
    file_id, user_id, file_name, file_size_bytes, storage_key, status,
    content_type, created_at, updated_at, expires_at
"#;

/// PostgreSQL-backed upload record store
#[derive(Clone)]
pub struct FileUploadRepository {
    pool: PgPool,
}

impl FileUploadRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Row shape of `file_uploads`; status is stored as text
#[derive(Debug, sqlx::FromRow)]
struct FileUploadRow {
    file_id: Uuid,
    user_id: String,
    file_name: String,
    file_size_bytes: i64,
    storage_key: String,
    status: String,
    content_type: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl FileUploadRow {
    fn into_domain(self) -> Result<UploadMetadata, AppError> {
        let status = self.status.parse::<UploadStatus>().map_err(|e| {
            AppError::Internal(format!("Corrupt status for upload {}: {}", self.file_id, e))
        })?;

        Ok(UploadMetadata {
            file_id: self.file_id,
            user_id: self.user_id,
            file_name: self.file_name,
            file_size_bytes: self.file_size_bytes,
            storage_key: self.storage_key,
            status,
            content_type: self.content_type,
            created_at: self.created_at,
            updated_at: self.updated_at,
            expires_at: self.expires_at,
        })
    }
}

#[async_trait::async_trait]
impl UploadRecordStore for FileUploadRepository {
    #[tracing::instrument(skip(self, record), fields(db.table = "file_uploads", db.operation = "insert", db.record_id = %record.file_id))]
    async fn put(&self, record: &UploadMetadata) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO file_uploads (
                file_id, user_id, file_name, file_size_bytes, storage_key, status,
                content_type, created_at, updated_at, expires_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(record.file_id)
        .bind(&record.user_id)
        .bind(&record.file_name)
        .bind(record.file_size_bytes)
        .bind(&record.storage_key)
        .bind(record.status.as_str())
        .bind(&record.content_type)
        .bind(record.created_at)
        .bind(record.updated_at)
        .bind(record.expires_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_uploads", db.operation = "select", db.record_id = %file_id))]
    async fn get(&self, file_id: Uuid) -> Result<Option<UploadMetadata>, AppError> {
        let query = format!("SELECT {} FROM file_uploads WHERE file_id = $1", SELECT_COLUMNS);
        let row = sqlx::query_as::<_, FileUploadRow>(&query)
            .bind(file_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(FileUploadRow::into_domain).transpose()
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_uploads", db.operation = "update", db.record_id = %file_id))]
    async fn conditional_update_status(
        &self,
        file_id: Uuid,
        from: UploadStatus,
        to: UploadStatus,
        at: DateTime<Utc>,
    ) -> Result<ConditionalUpdate, AppError> {
        let query = format!(
            r#"
            UPDATE file_uploads
            SET status = $3, updated_at = $4
            WHERE file_id = $1 AND status = $2
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );
        let row = sqlx::query_as::<_, FileUploadRow>(&query)
            .bind(file_id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(ConditionalUpdate::Applied(row.into_domain()?)),
            None => Ok(ConditionalUpdate::ConditionFailed),
        }
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_uploads", db.operation = "select"))]
    async fn scan_by_status_and_expiry(
        &self,
        status: UploadStatus,
        before: DateTime<Utc>,
        limit: i64,
    ) -> Result<Vec<UploadMetadata>, AppError> {
        let query = format!(
            r#"
            SELECT {}
            FROM file_uploads
            WHERE status = $1 AND expires_at <= $2
            ORDER BY expires_at ASC
            LIMIT $3
            "#,
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, FileUploadRow>(&query)
            .bind(status.as_str())
            .bind(before)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(FileUploadRow::into_domain).collect()
    }

    #[tracing::instrument(skip(self), fields(db.table = "file_uploads", db.operation = "delete"))]
    async fn purge_terminal_before(&self, before: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            r#"
            DELETE FROM file_uploads
            WHERE status <> 'PENDING' AND expires_at <= $1
            "#,
        )
        .bind(before)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
