use axum::extract::State;
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use tracing::info;

use crate::AppState;
use crate::error::ApiError;
use crate::extract::AdminIdentity;

/// `POST /admin/backup`: the full snapshot as a JSON download.
pub async fn backup(
    State(state): State<AppState>,
    AdminIdentity(identity): AdminIdentity,
) -> Result<Response, ApiError> {
    let snapshot = state.service.create_snapshot(&identity.user_id).await?;
    let body = snapshot.to_json_vec()?;
    let file_name = snapshot.file_name();
    info!(user_id = %identity.user_id, %file_name, bytes = body.len(), "backup served");

    Ok((
        [
            (CONTENT_TYPE, "application/json".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        body,
    )
        .into_response())
}
