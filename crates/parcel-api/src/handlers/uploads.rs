//! Upload lifecycle endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use parcel_core::models::{UploadMetadata, UploadRequest, UploadResponse};
use parcel_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

fn parse_file_id(raw: &str) -> Result<Uuid, HttpAppError> {
    Uuid::parse_str(raw).map_err(|_| {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid file id '{}': expected a UUID",
            raw
        )))
    })
}

/// Validate an upload request, create a PENDING record and return a direct-upload URL
#[utoipa::path(
    post,
    path = "/api/v1/uploads",
    tag = "uploads",
    params(("X-User-Id" = String, Header, description = "Authenticated caller id")),
    request_body = UploadRequest,
    responses(
        (status = 201, description = "Upload created", body = UploadResponse),
        (status = 400, description = "Missing file name, empty file or malformed body", body = ErrorResponse),
        (status = 401, description = "Missing caller identity", body = ErrorResponse),
        (status = 413, description = "File larger than the configured maximum", body = ErrorResponse),
        (status = 415, description = "Content type not accepted", body = ErrorResponse),
        (status = 500, description = "Storage or record store failure", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx, request), fields(user.id = %ctx.user_id))]
pub async fn create_upload(
    ctx: UserContext,
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<UploadRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let validated = state.lifecycle.validate(&request)?;
    let (_, grant) = state
        .lifecycle
        .create_upload(validated, &ctx.user_id)
        .await?;

    Ok((StatusCode::CREATED, Json(UploadResponse::from(grant))))
}

/// Get the current metadata of an upload
#[utoipa::path(
    get,
    path = "/api/v1/uploads/{file_id}",
    tag = "uploads",
    params(
        ("file_id" = Uuid, Path, description = "Upload id"),
        ("X-User-Id" = String, Header, description = "Authenticated caller id")
    ),
    responses(
        (status = 200, description = "Upload metadata", body = UploadMetadata),
        (status = 400, description = "Malformed upload id", body = ErrorResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(user.id = %ctx.user_id))]
pub async fn get_upload(
    ctx: UserContext,
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<UploadMetadata>, HttpAppError> {
    let file_id = parse_file_id(&file_id)?;
    let record = state
        .lifecycle
        .get_upload(file_id, Some(&ctx.user_id))
        .await?;
    Ok(Json(record))
}

/// Confirm that the client finished uploading. PENDING becomes UPLOADED.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{file_id}/confirm",
    tag = "uploads",
    params(
        ("file_id" = Uuid, Path, description = "Upload id"),
        ("X-User-Id" = String, Header, description = "Authenticated caller id")
    ),
    responses(
        (status = 200, description = "Upload confirmed", body = UploadMetadata),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 409, description = "Upload already terminal, expired, or object missing", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(user.id = %ctx.user_id))]
pub async fn confirm_upload(
    ctx: UserContext,
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<UploadMetadata>, HttpAppError> {
    let file_id = parse_file_id(&file_id)?;
    let record = state
        .lifecycle
        .confirm_upload(file_id, Some(&ctx.user_id))
        .await?;
    Ok(Json(record))
}

/// Issue a fresh upload URL for a PENDING upload. The URL expires with the record.
#[utoipa::path(
    post,
    path = "/api/v1/uploads/{file_id}/grant",
    tag = "uploads",
    params(
        ("file_id" = Uuid, Path, description = "Upload id"),
        ("X-User-Id" = String, Header, description = "Authenticated caller id")
    ),
    responses(
        (status = 200, description = "New upload URL", body = UploadResponse),
        (status = 404, description = "Upload not found", body = ErrorResponse),
        (status = 409, description = "Upload no longer pending", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, ctx), fields(user.id = %ctx.user_id))]
pub async fn reissue_grant(
    ctx: UserContext,
    State(state): State<Arc<AppState>>,
    Path(file_id): Path<String>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let file_id = parse_file_id(&file_id)?;
    let grant = state
        .lifecycle
        .reissue_grant(file_id, Some(&ctx.user_id))
        .await?;
    Ok(Json(UploadResponse::from(grant)))
}
