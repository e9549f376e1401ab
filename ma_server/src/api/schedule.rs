//! Academic schedule API handlers.
//!
//! Admins replace the schedule for a level/group pair by posting the raw
//! document; validation runs before any write, so a rejected payload names
//! the offending field and leaves the stored schedule intact. Students read
//! schedules by level and group.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use medacademy::schedule::{AcademicSchedule, ScheduleError};

use super::{AppState, ErrorResponse};

fn schedule_status(err: &ScheduleError) -> StatusCode {
    match err {
        ScheduleError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ScheduleError::MissingField(_)
        | ScheduleError::MissingEntryField { .. }
        | ScheduleError::Malformed(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ScheduleError::ScheduleNotFound { .. } => StatusCode::NOT_FOUND,
    }
}

/// Ingest a schedule document (admin).
///
/// Upserts by the document's own level/group pair. Validation failures name
/// the exact missing field so admins can fix their export.
///
/// # Request Body
///
/// ```json
/// {
///   "semester": "Fall",
///   "academic_year": "2026/2027",
///   "level": "2",
///   "group": "A",
///   "schedule": [
///     {
///       "day": "Sunday",
///       "time": "09:00-11:00",
///       "course_name": "Pharmacology",
///       "course_code": "NUR210",
///       "location": "Hall 3",
///       "staff": ["Dr. Mona"]
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// - `422 Unprocessable Entity`: Missing or malformed fields, e.g.
///   `{"error": "missing required field: group"}`
pub async fn ingest_schedule(
    State(state): State<AppState>,
    Json(payload): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<AcademicSchedule>), (StatusCode, Json<ErrorResponse>)> {
    match state.schedules.ingest(&payload).await {
        Ok(schedule) => Ok((StatusCode::CREATED, Json(schedule))),
        Err(e) => Err((schedule_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Get the stored schedule for a level/group pair.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/v1/schedules/year-2/A \
///   -H "Authorization: Bearer <token>"
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Nothing stored for this pair
pub async fn get_schedule(
    State(state): State<AppState>,
    Path((level, group)): Path<(String, String)>,
) -> Result<Json<AcademicSchedule>, (StatusCode, Json<ErrorResponse>)> {
    match state.schedules.get(&level, &group).await {
        Ok(schedule) => Ok(Json(schedule)),
        Err(e) => Err((schedule_status(&e), ErrorResponse::new(e.client_message()))),
    }
}
