use axum::Json;
use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::State;
use ludo_core::responses::RestoreResponse;
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::AdminIdentity;

/// Preferred multipart field name for the snapshot file.
pub const UPLOAD_FIELD: &str = "backup";

/// `POST /admin/restore`: replace the dataset with an uploaded snapshot.
pub async fn restore(
    State(state): State<AppState>,
    AdminIdentity(identity): AdminIdentity,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<RestoreResponse>, ApiError> {
    let raw = read_upload(multipart?).await?;
    info!(user_id = %identity.user_id, bytes = raw.len(), "restore requested");

    let result = state.service.restore(&raw, &identity.user_id).await?;
    Ok(Json(RestoreResponse::from(&result)))
}

/// The first non-empty field named [`UPLOAD_FIELD`] or carrying a file name.
async fn read_upload(mut multipart: Multipart) -> Result<Bytes, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        let is_upload = field.name() == Some(UPLOAD_FIELD) || field.file_name().is_some();
        if !is_upload {
            continue;
        }
        let bytes = field.bytes().await?;
        if !bytes.is_empty() {
            return Ok(bytes);
        }
    }
    Err(ApiError::BadRequest("No file uploaded".to_string()))
}
