//! Domain constants shared by the validator, the lifecycle manager, and configuration.
//!
//! These are the reference defaults; every one of them can be overridden through
//! [`crate::Config`] without touching the lifecycle logic.

/// The only content type accepted by default.
pub const CONTENT_TYPE_PDF: &str = "application/pdf";

/// Default maximum upload size (1 MiB).
pub const MAX_FILE_SIZE_BYTES: i64 = 1_048_576;

/// Default lifetime of an upload grant and of the PENDING record it belongs to.
pub const PRESIGNED_URL_TTL_SECONDS: u64 = 300;

/// Longest grant lifetime any backend will sign (S3 presigned URLs stop at 7 days).
pub const MAX_PRESIGNED_URL_TTL_SECONDS: u64 = 7 * 24 * 60 * 60;

/// Prefix under which every upload object is stored.
pub const UPLOAD_KEY_PREFIX: &str = "uploads";

/// Header carrying the caller's user id, set by the upstream gateway.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Longest accepted user id.
pub const MAX_USER_ID_LENGTH: usize = 128;
