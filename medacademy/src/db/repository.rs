//! Repository trait definitions for testability and dependency injection.
//!
//! The profile store is the durable system of record for student profiles
//! and progress. Managers depend on the trait rather than on sqlx directly
//! so the policy layer can be tested against in-memory implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Row};

use crate::entitlement::Tier;
use crate::identity::{IdentityError, IdentityResult, Profile, UserId};

/// Trait for student profile storage operations
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Fetch the persisted profile for a user, if any
    async fn fetch(&self, user_id: UserId) -> IdentityResult<Option<Profile>>;

    /// Insert or update the canonical profile record (write-through).
    ///
    /// Only the identity and entitlement fields are written; progress rows
    /// are owned by [`ProfileStore::complete_lesson`] and
    /// [`ProfileStore::record_quiz_grade`].
    async fn upsert(&self, profile: &Profile) -> IdentityResult<()>;

    /// Set tier and expiry directly (admin action or code redemption).
    /// Last write wins; no stronger ordering is provided.
    async fn set_entitlement(
        &self,
        user_id: UserId,
        tier: Tier,
        expiry: Option<DateTime<Utc>>,
    ) -> IdentityResult<()>;

    /// Mark a lesson as completed (idempotent)
    async fn complete_lesson(&self, user_id: UserId, lesson_id: &str) -> IdentityResult<()>;

    /// Record a quiz grade (0-100) for a lesson, replacing any previous grade
    async fn record_quiz_grade(
        &self,
        user_id: UserId,
        lesson_id: &str,
        grade: i16,
    ) -> IdentityResult<()>;

    /// Remove a profile entirely (explicit admin removal only)
    async fn delete(&self, user_id: UserId) -> IdentityResult<()>;
}

/// Default PostgreSQL implementation of [`ProfileStore`]
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn fetch(&self, user_id: UserId) -> IdentityResult<Option<Profile>> {
        let row = sqlx::query(
            "SELECT user_id, name, email, phone, subscription_tier, subscription_expiry
             FROM profiles WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let completed: Vec<String> = sqlx::query(
            "SELECT lesson_id FROM completed_lessons
             WHERE user_id = $1 ORDER BY completed_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|r| r.get("lesson_id"))
        .collect();

        let grades = sqlx::query(
            "SELECT lesson_id, grade FROM quiz_grades WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|r| (r.get::<String, _>("lesson_id"), r.get::<i16, _>("grade")))
        .collect();

        Ok(Some(Profile {
            user_id: row.get("user_id"),
            name: row.get("name"),
            email: row.get("email"),
            phone: row.get("phone"),
            // Malformed tier strings from older documents coerce to free.
            subscription_tier: row
                .get::<String, _>("subscription_tier")
                .parse()
                .unwrap_or_default(),
            subscription_expiry: row
                .get::<Option<chrono::NaiveDateTime>, _>("subscription_expiry")
                .map(|dt| dt.and_utc()),
            completed_lessons: completed,
            quiz_grades: grades,
        }))
    }

    async fn upsert(&self, profile: &Profile) -> IdentityResult<()> {
        sqlx::query(
            r#"
            INSERT INTO profiles (user_id, name, email, phone, subscription_tier, subscription_expiry, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, NOW())
            ON CONFLICT (user_id)
            DO UPDATE SET
                name = EXCLUDED.name,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                subscription_tier = EXCLUDED.subscription_tier,
                subscription_expiry = EXCLUDED.subscription_expiry,
                updated_at = NOW()
            "#,
        )
        .bind(profile.user_id)
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(&profile.phone)
        .bind(profile.subscription_tier.to_string())
        .bind(profile.subscription_expiry.map(|dt| dt.naive_utc()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn set_entitlement(
        &self,
        user_id: UserId,
        tier: Tier,
        expiry: Option<DateTime<Utc>>,
    ) -> IdentityResult<()> {
        let result = sqlx::query(
            "UPDATE profiles
             SET subscription_tier = $2, subscription_expiry = $3, updated_at = NOW()
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(tier.to_string())
        .bind(expiry.map(|dt| dt.naive_utc()))
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(IdentityError::ProfileNotFound(user_id));
        }
        Ok(())
    }

    async fn complete_lesson(&self, user_id: UserId, lesson_id: &str) -> IdentityResult<()> {
        sqlx::query(
            "INSERT INTO completed_lessons (user_id, lesson_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, lesson_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(lesson_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn record_quiz_grade(
        &self,
        user_id: UserId,
        lesson_id: &str,
        grade: i16,
    ) -> IdentityResult<()> {
        if !(0..=100).contains(&grade) {
            return Err(IdentityError::InvalidGrade(grade));
        }

        sqlx::query(
            "INSERT INTO quiz_grades (user_id, lesson_id, grade, recorded_at)
             VALUES ($1, $2, $3, NOW())
             ON CONFLICT (user_id, lesson_id)
             DO UPDATE SET grade = EXCLUDED.grade, recorded_at = NOW()",
        )
        .bind(user_id)
        .bind(lesson_id)
        .bind(grade)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> IdentityResult<()> {
        sqlx::query("DELETE FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
