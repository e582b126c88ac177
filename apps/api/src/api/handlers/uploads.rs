use axum::{
    extract::{Multipart, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::middleware::AuthUser;
use crate::api::state::AppState;

const FILE_FIELD: &str = "file";
const DEFAULT_FOLDER: &str = "uploads";

#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    pub bucket: Option<String>,
    pub folder: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub url: String,
}

/// Store an image and return its public URL
///
/// POST /api/uploads?bucket=<bucket>&folder=<folder>
pub async fn upload_image(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(params): Query<UploadParams>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_string();
        if !content_type.starts_with("image/") {
            return Err(ApiError::bad_request("Only image uploads are allowed"));
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();

        let bytes = field.bytes().await?;
        if bytes.len() > state.config.max_upload_bytes {
            return Err(ApiError::payload_too_large(format!(
                "File exceeds the maximum size of {} bytes",
                state.config.max_upload_bytes
            )));
        }

        let bucket = params
            .bucket
            .as_deref()
            .unwrap_or_else(|| state.config.default_bucket());
        let folder = params.folder.as_deref().unwrap_or(DEFAULT_FOLDER);

        let url = state
            .storage
            .upload(bucket, folder, &file_name, &bytes)
            .await?;

        tracing::info!(%user_id, %url, size = bytes.len(), "Image uploaded");
        return Ok((StatusCode::CREATED, Json(UploadResponse { url })));
    }

    Err(ApiError::bad_request("Missing file field"))
}
