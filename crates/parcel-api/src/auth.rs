//! Caller identity
//!
//! Authentication happens upstream. The gateway forwards the authenticated user id in
//! the `X-User-Id` header and this extractor only checks that it is present and sane.

use axum::{extract::FromRequestParts, http::request::Parts};
use parcel_core::constants::{MAX_USER_ID_LENGTH, USER_ID_HEADER};
use parcel_core::AppError;

use crate::error::HttpAppError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserContext {
    pub user_id: String,
}

impl<S> FromRequestParts<S> for UserContext
where
    S: Send + Sync,
{
    type Rejection = HttpAppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| unauthorized("Missing X-User-Id header"))?
            .to_str()
            .map_err(|_| unauthorized("X-User-Id header must be visible ASCII"))?;

        let user_id = raw.trim();
        if user_id.is_empty() {
            return Err(unauthorized("X-User-Id header is empty"));
        }
        if user_id.len() > MAX_USER_ID_LENGTH {
            return Err(unauthorized("X-User-Id header is too long"));
        }
        if user_id.chars().any(char::is_control) {
            return Err(unauthorized("X-User-Id header contains control characters"));
        }

        Ok(UserContext {
            user_id: user_id.to_string(),
        })
    }
}

fn unauthorized(message: &str) -> HttpAppError {
    HttpAppError(AppError::Unauthorized(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<UserContext, HttpAppError> {
        let mut builder = Request::builder().uri("/api/v1/uploads");
        if let Some(value) = header {
            builder = builder.header("X-User-Id", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        UserContext::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_header_is_trimmed() {
        let ctx = extract(Some("  user-42 ")).await.unwrap();
        assert_eq!(ctx.user_id, "user-42");
    }

    #[tokio::test]
    async fn test_missing_or_blank_header_is_unauthorized() {
        for header in [None, Some(""), Some("   ")] {
            let err = extract(header).await.unwrap_err();
            assert!(matches!(err.0, AppError::Unauthorized(_)));
        }
    }

    #[tokio::test]
    async fn test_overlong_header_is_unauthorized() {
        let long = "u".repeat(MAX_USER_ID_LENGTH + 1);
        assert!(extract(Some(&long)).await.is_err());
    }
}
