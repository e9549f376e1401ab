//! Activation code manager implementation.

use chrono::{Duration, Utc};
use rand::Rng;
use sqlx::{PgPool, Row};
use std::sync::Arc;

use super::{
    errors::{ActivationError, ActivationResult},
    models::{ActivationCode, Redemption},
};
use crate::entitlement::Tier;
use crate::identity::UserId;

/// Fixed, human-recognizable code prefix
const CODE_PREFIX: &str = "MED";

/// Alphanumeric alphabet without the confusable characters 0/O/1/I
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Blocks per code and characters per block ("MED-XXXX-XXXX-XXXX")
const CODE_BLOCKS: usize = 3;
const BLOCK_LEN: usize = 4;

/// Largest batch an admin may request at once
const MAX_BATCH_SIZE: u32 = 500;

/// Activation code manager
#[derive(Clone)]
pub struct ActivationManager {
    pool: Arc<PgPool>,
}

impl ActivationManager {
    /// Create a new activation code manager
    ///
    /// # Arguments
    ///
    /// * `pool` - Database connection pool
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Generate a batch of fresh codes
    ///
    /// # Arguments
    ///
    /// * `count` - Number of codes to create (1 to 500)
    /// * `days` - Subscription length each code grants on redemption
    ///
    /// # Returns
    ///
    /// * `ActivationResult<Vec<ActivationCode>>` - The created codes
    ///
    /// # Errors
    ///
    /// * `ActivationError::InvalidBatch` - Count or days out of range
    pub async fn generate_batch(
        &self,
        count: u32,
        days: i32,
    ) -> ActivationResult<Vec<ActivationCode>> {
        if count == 0 || count > MAX_BATCH_SIZE {
            return Err(ActivationError::InvalidBatch(format!(
                "count must be between 1 and {MAX_BATCH_SIZE}, got {count}"
            )));
        }
        if days <= 0 {
            return Err(ActivationError::InvalidBatch(format!(
                "days must be positive, got {days}"
            )));
        }

        let mut codes = Vec::with_capacity(count as usize);
        for _ in 0..count {
            codes.push(self.insert_fresh_code(days).await?);
        }
        Ok(codes)
    }

    /// Insert one code, regenerating on the (unlikely) collision
    async fn insert_fresh_code(&self, days: i32) -> ActivationResult<ActivationCode> {
        loop {
            let code = generate_code(&mut rand::rng());
            let row = sqlx::query(
                r#"
                INSERT INTO activation_codes (code, is_used, days)
                VALUES ($1, FALSE, $2)
                ON CONFLICT (code) DO NOTHING
                RETURNING id, code, is_used, days, created_at
                "#,
            )
            .bind(&code)
            .bind(days)
            .fetch_optional(self.pool.as_ref())
            .await?;

            if let Some(row) = row {
                return Ok(ActivationCode {
                    id: row.get("id"),
                    code: row.get("code"),
                    is_used: row.get("is_used"),
                    days: row.get("days"),
                    created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
                });
            }
            log::warn!("activation code collision, regenerating");
        }
    }

    /// Redeem a code for a user, granting `pro` for the code's duration.
    ///
    /// The code flip and the profile grant happen in a single transaction.
    /// The flip is a conditional update, so two concurrent redemption
    /// attempts on the same code yield exactly one success.
    ///
    /// # Arguments
    ///
    /// * `code` - The code string as entered by the admin
    /// * `user_id` - Target user
    ///
    /// # Returns
    ///
    /// * `ActivationResult<Redemption>` - Grant details on success
    ///
    /// # Errors
    ///
    /// * `ActivationError::CodeNotFound` - No such code
    /// * `ActivationError::CodeAlreadyUsed` - Code was consumed earlier (or
    ///   lost the race to a concurrent redemption)
    /// * `ActivationError::ProfileNotFound` - Target user has no profile
    pub async fn redeem(&self, code: &str, user_id: UserId) -> ActivationResult<Redemption> {
        let mut tx = self.pool.begin().await?;

        // Atomically consume the code; the WHERE clause is the concurrency
        // guard, not an optimization.
        let consumed = sqlx::query(
            "UPDATE activation_codes
             SET is_used = TRUE
             WHERE code = $1 AND is_used = FALSE
             RETURNING days",
        )
        .bind(code)
        .fetch_optional(&mut *tx)
        .await?;

        let days: i32 = match consumed {
            Some(row) => row.get("days"),
            None => {
                // Either the code doesn't exist or it was already used.
                let existing = sqlx::query("SELECT is_used FROM activation_codes WHERE code = $1")
                    .bind(code)
                    .fetch_optional(&mut *tx)
                    .await?;

                return match existing {
                    Some(_) => Err(ActivationError::CodeAlreadyUsed),
                    None => Err(ActivationError::CodeNotFound),
                };
            }
        };

        let expires_at = Utc::now() + Duration::days(i64::from(days));
        let granted = sqlx::query(
            "UPDATE profiles
             SET subscription_tier = $2, subscription_expiry = $3, updated_at = NOW()
             WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(Tier::Pro.to_string())
        .bind(expires_at.naive_utc())
        .execute(&mut *tx)
        .await?;

        if granted.rows_affected() == 0 {
            // Dropping the transaction rolls the code flip back.
            return Err(ActivationError::ProfileNotFound(user_id));
        }

        tx.commit().await?;

        Ok(Redemption {
            code: code.to_string(),
            user_id,
            days,
            expires_at,
        })
    }

    /// List recently created codes for the admin surface
    pub async fn list_codes(&self, limit: i64) -> ActivationResult<Vec<ActivationCode>> {
        let rows = sqlx::query(
            "SELECT id, code, is_used, days, created_at
             FROM activation_codes
             ORDER BY created_at DESC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| ActivationCode {
                id: row.get("id"),
                code: row.get("code"),
                is_used: row.get("is_used"),
                days: row.get("days"),
                created_at: row.get::<chrono::NaiveDateTime, _>("created_at").and_utc(),
            })
            .collect())
    }

    /// Bulk-delete consumed codes. Issued codes are never touched.
    ///
    /// # Returns
    ///
    /// * `ActivationResult<u64>` - Number of codes removed
    pub async fn purge_redeemed(&self) -> ActivationResult<u64> {
        let result = sqlx::query("DELETE FROM activation_codes WHERE is_used = TRUE")
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected())
    }
}

/// Generate one human-readable code: prefix plus grouped alphanumeric blocks.
///
/// The scheme only needs to be collision-resistant for admin batch sizes;
/// distribution is manual, so cryptographic unguessability is not required.
pub fn generate_code<R: Rng>(rng: &mut R) -> String {
    let mut code = String::with_capacity(CODE_PREFIX.len() + CODE_BLOCKS * (BLOCK_LEN + 1));
    code.push_str(CODE_PREFIX);
    for _ in 0..CODE_BLOCKS {
        code.push('-');
        for _ in 0..BLOCK_LEN {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            code.push(CODE_ALPHABET[idx] as char);
        }
    }
    code
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_code_format() {
        let code = generate_code(&mut rand::rng());
        assert_eq!(code.len(), 3 + 3 * 5);
        assert!(code.starts_with("MED-"));
        for block in code.split('-').skip(1) {
            assert_eq!(block.len(), 4);
            assert!(block.bytes().all(|b| CODE_ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_codes_avoid_confusable_characters() {
        for _ in 0..100 {
            let code = generate_code(&mut rand::rng());
            assert!(!code.contains('0'));
            assert!(!code.contains('O'));
            assert!(!code.contains('1'));
            assert!(!code.contains('I'));
        }
    }

    #[test]
    fn test_batch_sized_generation_has_no_collisions() {
        // 32^12 possible codes; a batch of admin size must not collide.
        let mut rng = rand::rng();
        let codes: HashSet<String> = (0..500).map(|_| generate_code(&mut rng)).collect();
        assert_eq!(codes.len(), 500);
    }
}
