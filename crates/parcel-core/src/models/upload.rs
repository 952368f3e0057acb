use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Request to start a direct upload.
///
/// Missing fields decode to their zero value and are rejected by the validator
/// instead of failing JSON decoding.
#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Original file name, used for the storage key extension
    #[serde(default)]
    pub file_name: String,
    /// Declared size in bytes
    #[serde(default)]
    pub file_size_bytes: i64,
    /// MIME type of the file
    #[serde(default)]
    pub content_type: String,
}

/// Lifecycle state of an upload record.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UploadStatus {
    Pending,
    Uploaded,
    Rejected,
}

impl UploadStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, UploadStatus::Pending)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UploadStatus::Pending => "PENDING",
            UploadStatus::Uploaded => "UPLOADED",
            UploadStatus::Rejected => "REJECTED",
        }
    }
}

impl Display for UploadStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for UploadStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(UploadStatus::Pending),
            "UPLOADED" => Ok(UploadStatus::Uploaded),
            "REJECTED" => Ok(UploadStatus::Rejected),
            other => Err(format!("Unknown upload status: {}", other)),
        }
    }
}

/// Durable record of one upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadMetadata {
    pub file_id: Uuid,
    pub user_id: String,
    pub file_name: String,
    pub file_size_bytes: i64,
    pub storage_key: String,
    pub status: UploadStatus,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl UploadMetadata {
    /// True once `now` has reached `expires_at`.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at <= now
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }

    /// Seconds left before the record expires, zero once expired.
    pub fn seconds_remaining(&self, now: DateTime<Utc>) -> u64 {
        let remaining = (self.expires_at - now).num_seconds();
        if remaining > 0 {
            remaining as u64
        } else {
            0
        }
    }
}

/// Time-limited authorization to write one object directly to blob storage.
/// Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadGrant {
    pub file_id: Uuid,
    pub upload_url: String,
    /// Seconds until the URL stops working
    pub expires_in: u64,
}

/// Response returned when an upload is created or its grant re-issued
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    /// Identifier of the upload record
    pub file_id: Uuid,
    /// URL to PUT the file content to
    pub upload_url: String,
    /// Seconds until `upload_url` expires
    pub expires_in: u64,
}

impl From<UploadGrant> for UploadResponse {
    fn from(grant: UploadGrant) -> Self {
        Self {
            file_id: grant.file_id,
            upload_url: grant.upload_url,
            expires_in: grant.expires_in,
        }
    }
}
