//! Course asset upload API handlers.
//!
//! Assets are posted as a raw request body; the file name travels in the
//! path and the MIME type in the Content-Type header. Store failures come
//! back as a `failed` state in the response body rather than a bare 500, so
//! the admin UI can render the failed entry with its reason.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, header::CONTENT_TYPE},
};
use medacademy::uploads::{UploadError, UploadState};
use uuid::Uuid;

use super::{AppState, ErrorResponse};
use crate::metrics;

fn upload_status(err: &UploadError) -> StatusCode {
    match err {
        UploadError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        UploadError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
        UploadError::AlreadyResolved(_) => StatusCode::CONFLICT,
    }
}

/// Upload a course asset (admin).
///
/// # Example
///
/// ```bash
/// curl -X POST \
///   http://localhost:8080/api/v1/admin/courses/<course_id>/assets/lecture.mp4 \
///   -H "Authorization: Bearer <admin token>" \
///   -H "Content-Type: video/mp4" \
///   --data-binary @lecture.mp4
/// ```
///
/// # Response
///
/// Returns the final upload state:
/// ```json
/// {"state": "committed", "url": "https://cdn.example.com/courses/<id>/1693400000000_lecture.mp4"}
/// ```
/// or, when the blob store rejected the write:
/// ```json
/// {"state": "failed", "reason": "Upload failed, please try again"}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: File name is empty or contains path separators
pub async fn upload_asset(
    State(state): State<AppState>,
    Path((course_id, file_name)): Path<(Uuid, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadState>, (StatusCode, Json<ErrorResponse>)> {
    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    match state
        .uploads
        .upload_course_asset(course_id, &file_name, content_type, &body)
        .await
    {
        Ok(upload) => {
            let outcome = match &upload {
                UploadState::Committed { .. } => "committed",
                UploadState::Failed { .. } => "failed",
                UploadState::Pending { .. } => "pending",
            };
            metrics::asset_uploads_total(outcome);
            Ok(Json(upload))
        }
        Err(e) => {
            metrics::asset_uploads_total("rejected");
            Err((upload_status(&e), ErrorResponse::new(e.client_message())))
        }
    }
}
