//! Identity and profile data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::entitlement::Tier;

/// User ID type
pub type UserId = i64;

/// Placeholder display name for accounts that never set one ("new student").
pub const FALLBACK_DISPLAY_NAME: &str = "طالب جديد";

/// Identity as supplied by the authentication provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderIdentity {
    pub id: UserId,
    pub email: String,
    pub display_name: Option<String>,
    pub phone: Option<String>,
}

/// Canonical student profile, merged from persisted state and provider data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(rename = "id")]
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub subscription_tier: Tier,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_expiry: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_lessons: Vec<String>,
    /// Lesson id -> quiz percentage (0-100)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub quiz_grades: BTreeMap<String, i16>,
}

impl Profile {
    /// Default profile for a first-time sign-in: free tier, no expiry,
    /// empty progress.
    pub fn new_default(user_id: UserId, name: String, email: String) -> Self {
        Self {
            user_id,
            name,
            email,
            phone: String::new(),
            subscription_tier: Tier::Free,
            subscription_expiry: None,
            completed_lessons: Vec::new(),
            quiz_grades: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_serializes_with_external_field_names() {
        let profile = Profile::new_default(3, "Aya".to_string(), "aya@example.com".to_string());
        let value = serde_json::to_value(&profile).unwrap();

        assert_eq!(value["id"], 3);
        assert_eq!(value["subscriptionTier"], "free");
        assert!(
            value.get("subscriptionExpiry").is_none(),
            "absent expiry must be omitted, not null"
        );
        assert!(value.get("completedLessons").is_none());
    }

    #[test]
    fn test_profile_deserializes_sparse_document() {
        // Documents written by older clients may omit progress fields.
        let profile: Profile = serde_json::from_str(
            r#"{"id": 9, "name": "Omar", "email": "omar@example.com",
                "phone": "", "subscriptionTier": "pro",
                "subscriptionExpiry": "2031-01-01T00:00:00Z"}"#,
        )
        .unwrap();

        assert_eq!(profile.subscription_tier, Tier::Pro);
        assert!(profile.completed_lessons.is_empty());
        assert!(profile.quiz_grades.is_empty());
    }
}
