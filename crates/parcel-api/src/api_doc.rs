use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::handlers;
use parcel_core::models::{UploadMetadata, UploadRequest, UploadResponse, UploadStatus};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Parcel API",
        version = "0.1.0",
        description = "Direct-upload lifecycle service. Clients request an upload, PUT the bytes straight to storage with the returned URL, then confirm."
    ),
    paths(
        handlers::uploads::create_upload,
        handlers::uploads::get_upload,
        handlers::uploads::confirm_upload,
        handlers::uploads::reissue_grant,
    ),
    components(schemas(
        UploadRequest,
        UploadResponse,
        UploadMetadata,
        UploadStatus,
        ErrorResponse,
    )),
    tags(
        (name = "uploads", description = "Upload lifecycle")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
