//! Course catalog API handlers.
//!
//! The public listing exposes course summaries only. The detail endpoint is
//! authenticated: every lesson in the response carries an access verdict
//! computed from the student's normalized tier and the lesson's release flag,
//! so clients render locked slots and upgrade prompts without re-deriving
//! gating rules. Admin endpoints cover the full catalog lifecycle.

use axum::{
    Json,
    extract::{Extension, Path, State},
    http::StatusCode,
};
use medacademy::catalog::{CatalogError, Course, CourseSummary, Lesson, NewCourse};
use medacademy::entitlement::{LessonAccess, Tier, evaluate, gate};
use medacademy::identity::ProviderIdentity;
use serde::Serialize;
use uuid::Uuid;

use super::{AppState, ErrorResponse, middleware::AuthContext};
use crate::metrics;

/// Lesson with its access verdict attached for the requesting student
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatedLesson {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub access: LessonAccess,
}

/// Course detail as seen by one student
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatedCourse {
    pub id: Uuid,
    pub title: String,
    pub instructor: String,
    pub subject: String,
    pub image: String,
    pub price: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
    pub lessons: Vec<GatedLesson>,
}

fn catalog_status(err: &CatalogError) -> StatusCode {
    match err {
        CatalogError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        CatalogError::CourseNotFound(_) => StatusCode::NOT_FOUND,
        CatalogError::InvalidDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn verdict_label(access: LessonAccess) -> &'static str {
    match access {
        LessonAccess::Playable => "playable",
        LessonAccess::NotReleased => "not_released",
        LessonAccess::UpgradeRequired => "upgrade_required",
    }
}

/// List all courses (public).
///
/// Returns summaries without lesson bodies, so no gating applies here.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/api/v1/courses
/// ```
pub async fn list_courses(
    State(state): State<AppState>,
) -> Result<Json<Vec<CourseSummary>>, (StatusCode, Json<ErrorResponse>)> {
    match state.catalog.list_courses().await {
        Ok(courses) => Ok(Json(courses)),
        Err(e) => Err((catalog_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Get a course with per-lesson access verdicts for the authenticated student.
///
/// The student's tier is resolved and normalized first, so a lapsed
/// subscription is treated as free here even before storage catches up.
/// Denied lessons keep their titles and metadata; only the verdict changes.
///
/// # Response
///
/// Each lesson gains an `access` field:
/// ```json
/// {"id": "lesson-2", "title": "Wound care", "isLocked": false, "access": "upgrade_required"}
/// ```
///
/// # Errors
///
/// - `404 Not Found`: Unknown course id
/// - `422 Unprocessable Entity`: Stored curriculum document is malformed
pub async fn get_course(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthContext>,
    Path(course_id): Path<Uuid>,
) -> Result<Json<GatedCourse>, (StatusCode, Json<ErrorResponse>)> {
    let course = match state.catalog.get_course(course_id).await {
        Ok(course) => course,
        Err(e) => return Err((catalog_status(&e), ErrorResponse::new(e.client_message()))),
    };

    let identity = ProviderIdentity {
        id: ctx.user_id,
        email: ctx.email,
        display_name: None,
        phone: None,
    };
    let tier = match state.resolver.resolve(Some(identity)).await {
        Ok(Some(profile)) => evaluate(&profile).subscription_tier,
        // An unresolvable profile still gets the free preview
        Ok(None) => Tier::Free,
        Err(e) => {
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponse::new(e.client_message()),
            ));
        }
    };

    Ok(Json(gate_course(course, tier)))
}

fn gate_course(course: Course, tier: Tier) -> GatedCourse {
    let lessons = course
        .lessons
        .into_iter()
        .enumerate()
        .map(|(index, lesson)| {
            let access = gate::lesson_access(&lesson, index, tier);
            metrics::lesson_gate_verdicts_total(verdict_label(access));
            GatedLesson { lesson, access }
        })
        .collect();

    GatedCourse {
        id: course.id,
        title: course.title,
        instructor: course.instructor,
        subject: course.subject,
        image: course.image,
        price: course.price,
        original_price: course.original_price,
        lessons,
    }
}

/// Create a course (admin).
///
/// # Request Body
///
/// ```json
/// {
///   "title": "Fundamentals of Nursing",
///   "instructor": "Dr. Mona",
///   "subject": "nursing",
///   "image": "https://cdn.example.com/cover.png",
///   "price": 50000,
///   "lessons": []
/// }
/// ```
///
/// # Response
///
/// Returns `201 Created` with the stored course, including its new id.
pub async fn create_course(
    State(state): State<AppState>,
    Json(new_course): Json<NewCourse>,
) -> Result<(StatusCode, Json<Course>), (StatusCode, Json<ErrorResponse>)> {
    match state.catalog.create_course(new_course).await {
        Ok(course) => Ok((StatusCode::CREATED, Json(course))),
        Err(e) => Err((catalog_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Replace a course's fields and curriculum (admin).
///
/// The path id wins over any id in the body.
///
/// # Errors
///
/// - `404 Not Found`: Unknown course id
/// - `422 Unprocessable Entity`: Curriculum fails validation
pub async fn update_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
    Json(mut course): Json<Course>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    course.id = course_id;
    match state.catalog.update_course(&course).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((catalog_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

/// Delete a course (admin).
///
/// # Errors
///
/// - `404 Not Found`: Unknown course id
pub async fn delete_course(
    State(state): State<AppState>,
    Path(course_id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    match state.catalog.delete_course(course_id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e) => Err((catalog_status(&e), ErrorResponse::new(e.client_message()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str, is_locked: bool) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: format!("Lesson {id}"),
            duration: "10:00".to_string(),
            is_locked,
            contents: Vec::new(),
            quiz: None,
            flashcards: Vec::new(),
        }
    }

    fn course(lessons: Vec<Lesson>) -> Course {
        Course {
            id: Uuid::new_v4(),
            title: "Pharmacology".to_string(),
            instructor: "Dr. Sara".to_string(),
            subject: "nursing".to_string(),
            image: "https://cdn.example.com/pharm.png".to_string(),
            price: 45000,
            original_price: None,
            lessons,
        }
    }

    #[test]
    fn test_gated_course_free_tier_verdicts() {
        let c = course(vec![
            lesson("a", false),
            lesson("b", false),
            lesson("c", false),
            lesson("d", true),
        ]);
        let gated = gate_course(c, Tier::Free);

        let verdicts: Vec<LessonAccess> = gated.lessons.iter().map(|l| l.access).collect();
        assert_eq!(
            verdicts,
            vec![
                LessonAccess::Playable,
                LessonAccess::Playable,
                LessonAccess::UpgradeRequired,
                LessonAccess::NotReleased,
            ]
        );
    }

    #[test]
    fn test_gated_course_pro_tier_only_blocked_by_release_flag() {
        let c = course(vec![lesson("a", false), lesson("b", true), lesson("c", false)]);
        let gated = gate_course(c, Tier::Pro);

        assert_eq!(gated.lessons[0].access, LessonAccess::Playable);
        assert_eq!(gated.lessons[1].access, LessonAccess::NotReleased);
        assert_eq!(gated.lessons[2].access, LessonAccess::Playable);
    }

    #[test]
    fn test_gated_lesson_serializes_flat_with_access_field() {
        let gated = GatedLesson {
            lesson: lesson("a", false),
            access: LessonAccess::UpgradeRequired,
        };
        let value = serde_json::to_value(&gated).unwrap();
        assert_eq!(value["id"], "a");
        assert_eq!(value["isLocked"], false);
        assert_eq!(value["access"], "upgrade_required");
    }
}
