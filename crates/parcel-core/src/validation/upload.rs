use crate::config::UploadPolicy;
use crate::models::UploadRequest;

/// Reasons an upload request is refused before any record exists
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("File name is required")]
    MissingFileName,

    #[error("Unsupported content type: {content_type} (allowed: {allowed:?})")]
    UnsupportedContentType {
        content_type: String,
        allowed: Vec<String>,
    },

    #[error("Empty file")]
    EmptyFile,

    #[error("File too large: {size} bytes (max: {max} bytes)")]
    FileTooLarge { size: i64, max: i64 },
}

impl ValidationError {
    pub fn http_status_code(&self) -> u16 {
        match self {
            ValidationError::MissingFileName | ValidationError::EmptyFile => 400,
            ValidationError::FileTooLarge { .. } => 413,
            ValidationError::UnsupportedContentType { .. } => 415,
        }
    }

    pub fn suggested_action(&self) -> &'static str {
        match self {
            ValidationError::MissingFileName => "Provide a file name",
            ValidationError::UnsupportedContentType { .. } => "Upload a supported file type",
            ValidationError::EmptyFile => "Provide a non-empty file",
            ValidationError::FileTooLarge { .. } => "Reduce file size",
        }
    }
}

/// An upload request that passed every rule.
///
/// Fields are private and there is no public constructor, so holding one proves
/// the request went through [`UploadValidator::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    file_name: String,
    file_size_bytes: i64,
    content_type: String,
}

impl ValidatedRequest {
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size_bytes(&self) -> i64 {
        self.file_size_bytes
    }

    /// Lowercased content type
    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Checks upload requests against an [`UploadPolicy`].
///
/// Rules run in a fixed order and the first failure wins: file name, content type, size.
#[derive(Debug, Clone)]
pub struct UploadValidator {
    max_file_size_bytes: i64,
    allowed_content_types: Vec<String>,
}

impl UploadValidator {
    pub fn new(policy: &UploadPolicy) -> Self {
        Self {
            max_file_size_bytes: policy.max_file_size_bytes,
            allowed_content_types: policy
                .allowed_content_types
                .iter()
                .map(|ct| ct.to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn validate(&self, request: &UploadRequest) -> Result<ValidatedRequest, ValidationError> {
        let file_name = request.file_name.trim();
        if file_name.is_empty() {
            return Err(ValidationError::MissingFileName);
        }

        let content_type = self.validate_content_type(&request.content_type)?;
        self.validate_file_size(request.file_size_bytes)?;

        Ok(ValidatedRequest {
            file_name: file_name.to_string(),
            file_size_bytes: request.file_size_bytes,
            content_type,
        })
    }

    fn validate_content_type(&self, content_type: &str) -> Result<String, ValidationError> {
        let normalized = content_type.to_ascii_lowercase();

        if !self.allowed_content_types.iter().any(|ct| ct == &normalized) {
            return Err(ValidationError::UnsupportedContentType {
                content_type: content_type.to_string(),
                allowed: self.allowed_content_types.clone(),
            });
        }

        Ok(normalized)
    }

    fn validate_file_size(&self, size: i64) -> Result<(), ValidationError> {
        if size <= 0 {
            return Err(ValidationError::EmptyFile);
        }

        if size > self.max_file_size_bytes {
            return Err(ValidationError::FileTooLarge {
                size,
                max: self.max_file_size_bytes,
            });
        }

        Ok(())
    }
}

impl Default for UploadValidator {
    fn default() -> Self {
        Self::new(&UploadPolicy::default())
    }
}
