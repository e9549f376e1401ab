//! Schedule manager implementation.

use sqlx::{PgPool, Row};
use std::sync::Arc;

use super::{
    errors::{ScheduleError, ScheduleResult},
    models::{AcademicSchedule, parse_schedule},
};

/// Schedule manager
#[derive(Clone)]
pub struct ScheduleManager {
    pool: Arc<PgPool>,
}

impl ScheduleManager {
    /// Create a new schedule manager
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Validate and store an admin-supplied schedule payload.
    ///
    /// Validation runs to completion before the write; a rejected payload
    /// leaves the stored schedule untouched.
    ///
    /// # Arguments
    ///
    /// * `payload` - Raw JSON as submitted by the admin
    ///
    /// # Returns
    ///
    /// * `ScheduleResult<AcademicSchedule>` - The parsed, stored schedule
    pub async fn ingest(&self, payload: &serde_json::Value) -> ScheduleResult<AcademicSchedule> {
        let schedule = parse_schedule(payload)?;

        let document = serde_json::to_string(&schedule)
            .map_err(|e| ScheduleError::Malformed(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO schedules (level, group_name, semester, academic_year, document, updated_at)
            VALUES ($1, $2, $3, $4, $5, NOW())
            ON CONFLICT (level, group_name)
            DO UPDATE SET
                semester = EXCLUDED.semester,
                academic_year = EXCLUDED.academic_year,
                document = EXCLUDED.document,
                updated_at = NOW()
            "#,
        )
        .bind(&schedule.level)
        .bind(&schedule.group)
        .bind(&schedule.semester)
        .bind(&schedule.academic_year)
        .bind(&document)
        .execute(self.pool.as_ref())
        .await?;

        Ok(schedule)
    }

    /// Fetch the stored schedule for a level/group pair
    ///
    /// # Errors
    ///
    /// * `ScheduleError::ScheduleNotFound` - Nothing stored for this pair
    pub async fn get(&self, level: &str, group: &str) -> ScheduleResult<AcademicSchedule> {
        let row = sqlx::query("SELECT document FROM schedules WHERE level = $1 AND group_name = $2")
            .bind(level)
            .bind(group)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| ScheduleError::ScheduleNotFound {
                level: level.to_string(),
                group: group.to_string(),
            })?;

        serde_json::from_str(&row.get::<String, _>("document"))
            .map_err(|e| ScheduleError::Malformed(e.to_string()))
    }
}
