//! Catalog manager implementation.

use sqlx::{PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

use super::{
    errors::{CatalogError, CatalogResult},
    models::{Course, CourseId, CourseSummary, Lesson, NewCourse},
};

/// Catalog manager
///
/// CRUD over the course collection with lesson documents validated on every
/// read and write. The store is ground truth; callers must not cache courses
/// across requests.
#[derive(Clone)]
pub struct CatalogManager {
    pool: Arc<PgPool>,
}

impl CatalogManager {
    /// Create a new catalog manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// List all courses without lesson bodies
    pub async fn list_courses(&self) -> CatalogResult<Vec<CourseSummary>> {
        let rows = sqlx::query(
            "SELECT id, title, instructor, subject, image_url, price, original_price, lessons
             FROM courses
             ORDER BY created_at",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter()
            .map(|row| {
                let lessons = parse_lessons(&row.get::<String, _>("lessons"))?;
                Ok(CourseSummary {
                    id: row.get("id"),
                    title: row.get("title"),
                    instructor: row.get("instructor"),
                    subject: row.get("subject"),
                    image: row.get("image_url"),
                    price: row.get("price"),
                    original_price: row.get("original_price"),
                    lesson_count: lessons.len(),
                })
            })
            .collect()
    }

    /// Get a single course with its full curriculum
    ///
    /// # Errors
    ///
    /// * `CatalogError::CourseNotFound` - No course with this id
    /// * `CatalogError::InvalidDocument` - Stored lesson document is malformed
    pub async fn get_course(&self, course_id: CourseId) -> CatalogResult<Course> {
        let row = sqlx::query(
            "SELECT id, title, instructor, subject, image_url, price, original_price, lessons
             FROM courses WHERE id = $1",
        )
        .bind(course_id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or(CatalogError::CourseNotFound(course_id))?;

        Ok(Course {
            id: row.get("id"),
            title: row.get("title"),
            instructor: row.get("instructor"),
            subject: row.get("subject"),
            image: row.get("image_url"),
            price: row.get("price"),
            original_price: row.get("original_price"),
            lessons: parse_lessons(&row.get::<String, _>("lessons"))?,
        })
    }

    /// Create a course
    ///
    /// # Arguments
    ///
    /// * `new_course` - Course fields; the id is assigned here
    ///
    /// # Returns
    ///
    /// * `CatalogResult<Course>` - The created course
    pub async fn create_course(&self, new_course: NewCourse) -> CatalogResult<Course> {
        validate_lessons(&new_course.lessons)?;

        let course = Course {
            id: Uuid::new_v4(),
            title: new_course.title,
            instructor: new_course.instructor,
            subject: new_course.subject,
            image: new_course.image,
            price: new_course.price,
            original_price: new_course.original_price,
            lessons: new_course.lessons,
        };

        sqlx::query(
            r#"
            INSERT INTO courses (id, title, instructor, subject, image_url, price, original_price, lessons)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.instructor)
        .bind(&course.subject)
        .bind(&course.image)
        .bind(course.price)
        .bind(course.original_price)
        .bind(serialize_lessons(&course.lessons)?)
        .execute(self.pool.as_ref())
        .await?;

        Ok(course)
    }

    /// Replace a course's fields and curriculum
    ///
    /// # Errors
    ///
    /// * `CatalogError::CourseNotFound` - No course with this id
    pub async fn update_course(&self, course: &Course) -> CatalogResult<()> {
        validate_lessons(&course.lessons)?;

        let result = sqlx::query(
            "UPDATE courses
             SET title = $2, instructor = $3, subject = $4, image_url = $5,
                 price = $6, original_price = $7, lessons = $8, updated_at = NOW()
             WHERE id = $1",
        )
        .bind(course.id)
        .bind(&course.title)
        .bind(&course.instructor)
        .bind(&course.subject)
        .bind(&course.image)
        .bind(course.price)
        .bind(course.original_price)
        .bind(serialize_lessons(&course.lessons)?)
        .execute(self.pool.as_ref())
        .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::CourseNotFound(course.id));
        }
        Ok(())
    }

    /// Delete a course
    ///
    /// # Errors
    ///
    /// * `CatalogError::CourseNotFound` - No course with this id
    pub async fn delete_course(&self, course_id: CourseId) -> CatalogResult<()> {
        let result = sqlx::query("DELETE FROM courses WHERE id = $1")
            .bind(course_id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CatalogError::CourseNotFound(course_id));
        }
        Ok(())
    }
}

/// Parse a stored lesson document, rejecting malformed data at the boundary
fn parse_lessons(raw: &str) -> CatalogResult<Vec<Lesson>> {
    let lessons: Vec<Lesson> = serde_json::from_str(raw)
        .map_err(|e| CatalogError::InvalidDocument(e.to_string()))?;
    validate_lessons(&lessons)?;
    Ok(lessons)
}

fn serialize_lessons(lessons: &[Lesson]) -> CatalogResult<String> {
    serde_json::to_string(lessons).map_err(|e| CatalogError::InvalidDocument(e.to_string()))
}

/// Structural checks beyond what serde enforces
fn validate_lessons(lessons: &[Lesson]) -> CatalogResult<()> {
    let mut seen = std::collections::HashSet::new();
    for lesson in lessons {
        if lesson.id.is_empty() {
            return Err(CatalogError::InvalidDocument(
                "lesson with empty id".to_string(),
            ));
        }
        if !seen.insert(lesson.id.as_str()) {
            return Err(CatalogError::InvalidDocument(format!(
                "duplicate lesson id: {}",
                lesson.id
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str) -> Lesson {
        Lesson {
            id: id.to_string(),
            title: "T".to_string(),
            duration: "5:00".to_string(),
            is_locked: false,
            contents: Vec::new(),
            quiz: None,
            flashcards: Vec::new(),
        }
    }

    #[test]
    fn test_parse_lessons_round_trip() {
        let lessons = vec![lesson("a"), lesson("b")];
        let raw = serialize_lessons(&lessons).unwrap();
        assert_eq!(parse_lessons(&raw).unwrap(), lessons);
    }

    #[test]
    fn test_parse_lessons_rejects_garbage() {
        let err = parse_lessons("{not json").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDocument(_)));
    }

    #[test]
    fn test_validate_rejects_duplicate_ids() {
        let err = validate_lessons(&[lesson("a"), lesson("a")]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDocument(reason) if reason.contains("duplicate")));
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        let err = validate_lessons(&[lesson("")]).unwrap_err();
        assert!(matches!(err, CatalogError::InvalidDocument(_)));
    }
}
