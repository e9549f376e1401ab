//! Activation code data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::UserId;

/// Activation code model
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivationCode {
    pub id: i64,
    /// Human-enterable code string, e.g. "MED-7KQ2-9XNF-P4RW"
    pub code: String,
    pub is_used: bool,
    /// Subscription length granted on redemption
    pub days: i32,
    pub created_at: DateTime<Utc>,
}

/// Outcome of a successful redemption
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Redemption {
    pub code: String,
    pub user_id: UserId,
    pub days: i32,
    /// New subscription expiry for the target profile
    pub expires_at: DateTime<Utc>,
}
