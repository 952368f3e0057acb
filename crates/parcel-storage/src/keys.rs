//! Shared key generation for storage backends.
//!
//! Key format: `uploads/{urlencoded user_id}/{file_id}.{ext}`.

use parcel_core::constants::UPLOAD_KEY_PREFIX;
use std::path::Path;
use uuid::Uuid;

const FALLBACK_EXTENSION: &str = "bin";
const MAX_EXTENSION_LENGTH: usize = 16;

/// Generate the storage key for an upload.
///
/// Pure function of its inputs. The user id is percent-encoded (dots included) so it
/// always stays a single path segment; the extension comes from the file name,
/// lowercased, and falls back to `bin` when absent or not alphanumeric.
pub fn generate_upload_key(user_id: &str, file_id: Uuid, file_name: &str) -> String {
    let user_segment = urlencoding::encode(user_id).replace('.', "%2E");
    format!(
        "{}/{}/{}.{}",
        UPLOAD_KEY_PREFIX,
        user_segment,
        file_id,
        extension_of(file_name)
    )
}

fn extension_of(file_name: &str) -> String {
    Path::new(file_name.trim())
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| {
            !e.is_empty()
                && e.len() <= MAX_EXTENSION_LENGTH
                && e.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_else(|| FALLBACK_EXTENSION.to_string())
}
