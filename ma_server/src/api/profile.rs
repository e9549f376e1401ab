//! Student profile API handlers.
//!
//! The profile endpoint resolves the authenticated identity into the
//! canonical student record (merging persisted fields with token defaults
//! and applying the owner override), then normalizes the entitlement against
//! the clock before returning it. The progress endpoints write lesson
//! completions and quiz grades.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use medacademy::entitlement::evaluate;
use medacademy::identity::{IdentityError, Profile, ProviderIdentity};
use serde::Deserialize;

use super::{AppState, ErrorResponse, middleware::AuthContext};

#[derive(Debug, Deserialize)]
pub struct QuizGradePayload {
    pub lesson_id: String,
    pub grade: i16,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfilePayload {
    pub name: Option<String>,
    pub phone: Option<String>,
}

fn identity_status(err: &IdentityError) -> StatusCode {
    match err {
        IdentityError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        IdentityError::ProfileNotFound(_) => StatusCode::NOT_FOUND,
        IdentityError::InvalidGrade(_) => StatusCode::BAD_REQUEST,
    }
}

/// Get the authenticated student's resolved profile.
///
/// The returned record is the canonical merge of the persisted profile and
/// the token's identity, with the subscription tier already normalized: a
/// lapsed `pro` subscription comes back as `free` here even though storage
/// still holds the stale tier.
///
/// # Response
///
/// ```json
/// {
///   "id": 42,
///   "name": "Student One",
///   "email": "student@example.com",
///   "phone": "",
///   "subscriptionTier": "pro",
///   "subscriptionExpiry": "2026-09-29T10:00:00Z",
///   "completedLessons": ["lesson-0"],
///   "quizGrades": {"lesson-0": 92}
/// }
/// ```
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
) -> Result<Json<Profile>, (StatusCode, Json<ErrorResponse>)> {
    let identity = ProviderIdentity {
        id: ctx.user_id,
        email: ctx.email,
        display_name: None,
        phone: None,
    };

    match state.resolver.resolve(Some(identity)).await {
        Ok(Some(profile)) => Ok(Json(evaluate(&profile))),
        // resolve(Some(..)) only returns None for an absent identity
        Ok(None) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Internal server error"),
        )),
        Err(e) => Err((identity_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Edit the authenticated student's profile fields.
///
/// Only the display name and phone can be edited here; entitlement fields
/// change exclusively through code redemption or admin action. Omitted
/// fields are left as they are.
///
/// # Request Body
///
/// ```json
/// {"name": "Student One", "phone": "0100000000"}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: No profile exists for this account yet
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<UpdateProfilePayload>,
) -> Result<Json<Profile>, (StatusCode, Json<ErrorResponse>)> {
    let stored = match state.profile_store.fetch(ctx.user_id).await {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            let e = IdentityError::ProfileNotFound(ctx.user_id);
            return Err((identity_status(&e), ErrorResponse::new(e.client_message())));
        }
        Err(e) => return Err((identity_status(&e), ErrorResponse::new(e.client_message()))),
    };

    let mut updated = stored;
    if let Some(name) = payload.name {
        updated.name = name;
    }
    if let Some(phone) = payload.phone {
        updated.phone = phone;
    }

    match state.profile_store.upsert(&updated).await {
        Ok(()) => Ok(Json(evaluate(&updated))),
        Err(e) => Err((identity_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Remove a student's profile entirely (admin).
///
/// Progress rows go with it. The account itself is untouched; a later login
/// recreates a default free-tier profile.
///
/// # Response
///
/// Returns `204 No Content` on success.
pub async fn delete_profile(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.profile_store.delete(user_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((identity_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Mark a lesson as completed for the authenticated student.
///
/// Idempotent: completing an already-completed lesson is a no-op success.
///
/// # Response
///
/// Returns `204 No Content` on success.
pub async fn complete_lesson(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(lesson_id): Path<String>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state
        .profile_store
        .complete_lesson(ctx.user_id, &lesson_id)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((identity_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Record a quiz grade for the authenticated student.
///
/// Replaces any previous grade for the same lesson.
///
/// # Request Body
///
/// ```json
/// {"lesson_id": "lesson-0", "grade": 92}
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Grade outside 0-100
pub async fn record_quiz_grade(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Json(payload): Json<QuizGradePayload>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state
        .profile_store
        .record_quiz_grade(ctx.user_id, &payload.lesson_id, payload.grade)
        .await
    {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((identity_status(&e), ErrorResponse::new(e.client_message()))),
    }
}
