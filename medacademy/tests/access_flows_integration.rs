//! End-to-end access-control flows against an in-memory profile store.
//!
//! Covers the full subscription lifecycle: default free sign-up, an admin
//! grant of timed `pro` access, lapse-on-expiry, and the per-lesson gate
//! verdicts a client would render at each step.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use medacademy::catalog::Lesson;
use medacademy::db::ProfileStore;
use medacademy::entitlement::{evaluate, evaluate_at, lesson_access, LessonAccess, Tier};
use medacademy::identity::{
    IdentityError, IdentityResolver, IdentityResult, Profile, ProviderIdentity, UserId,
};
use medacademy::schedule::{parse_schedule, ScheduleError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// In-memory profile store shared by the flows below
#[derive(Default)]
struct InMemoryProfileStore {
    profiles: Mutex<HashMap<UserId, Profile>>,
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn fetch(&self, user_id: UserId) -> IdentityResult<Option<Profile>> {
        Ok(self.profiles.lock().unwrap().get(&user_id).cloned())
    }

    async fn upsert(&self, profile: &Profile) -> IdentityResult<()> {
        self.profiles
            .lock()
            .unwrap()
            .insert(profile.user_id, profile.clone());
        Ok(())
    }

    async fn set_entitlement(
        &self,
        user_id: UserId,
        tier: Tier,
        expiry: Option<DateTime<Utc>>,
    ) -> IdentityResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(&user_id)
            .ok_or(IdentityError::ProfileNotFound(user_id))?;
        profile.subscription_tier = tier;
        profile.subscription_expiry = expiry;
        Ok(())
    }

    async fn complete_lesson(&self, user_id: UserId, lesson_id: &str) -> IdentityResult<()> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(&user_id)
            .ok_or(IdentityError::ProfileNotFound(user_id))?;
        if !profile.completed_lessons.iter().any(|l| l == lesson_id) {
            profile.completed_lessons.push(lesson_id.to_string());
        }
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
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .get_mut(&user_id)
            .ok_or(IdentityError::ProfileNotFound(user_id))?;
        profile.quiz_grades.insert(lesson_id.to_string(), grade);
        Ok(())
    }

    async fn delete(&self, user_id: UserId) -> IdentityResult<()> {
        self.profiles.lock().unwrap().remove(&user_id);
        Ok(())
    }
}

fn course_lessons() -> Vec<Lesson> {
    (0..5)
        .map(|i| Lesson {
            id: format!("lesson-{i}"),
            title: format!("Unit {i}"),
            duration: "15:00".to_string(),
            is_locked: i == 4, // last lesson not released yet
            contents: Vec::new(),
            quiz: None,
            flashcards: Vec::new(),
        })
        .collect()
}

fn verdicts(lessons: &[Lesson], tier: Tier) -> Vec<LessonAccess> {
    lessons
        .iter()
        .enumerate()
        .map(|(index, lesson)| lesson_access(lesson, index, tier))
        .collect()
}

#[tokio::test]
async fn test_new_signup_gets_free_preview_only() {
    let store = Arc::new(InMemoryProfileStore::default());
    let resolver = IdentityResolver::new(store, vec![]);

    let profile = resolver
        .resolve(Some(ProviderIdentity {
            id: 1,
            email: "rana@example.com".to_string(),
            display_name: Some("Rana".to_string()),
            phone: None,
        }))
        .await
        .unwrap()
        .expect("authenticated identity must resolve");

    let tier = evaluate(&profile).subscription_tier;
    assert_eq!(tier, Tier::Free);

    let lessons = course_lessons();
    assert_eq!(
        verdicts(&lessons, tier),
        vec![
            LessonAccess::Playable,
            LessonAccess::Playable,
            LessonAccess::UpgradeRequired,
            LessonAccess::UpgradeRequired,
            LessonAccess::NotReleased,
        ]
    );
}

#[tokio::test]
async fn test_thirty_day_grant_unlocks_released_lessons() {
    let store = Arc::new(InMemoryProfileStore::default());
    let resolver = IdentityResolver::new(Arc::clone(&store) as Arc<dyn ProfileStore>, vec![]);

    let identity = ProviderIdentity {
        id: 2,
        email: "hadi@example.com".to_string(),
        display_name: None,
        phone: None,
    };
    resolver.resolve(Some(identity.clone())).await.unwrap();

    // Admin grants 30 days of pro (what a code redemption performs)
    store
        .set_entitlement(2, Tier::Pro, Some(Utc::now() + Duration::days(30)))
        .await
        .unwrap();

    let profile = resolver
        .resolve(Some(identity))
        .await
        .unwrap()
        .unwrap();
    let tier = evaluate(&profile).subscription_tier;
    assert_eq!(tier, Tier::Pro);

    let lessons = course_lessons();
    let all = verdicts(&lessons, tier);
    assert!(all[..4].iter().all(|v| v.is_playable()));
    // Release flag still wins over the subscription
    assert_eq!(all[4], LessonAccess::NotReleased);
}

#[tokio::test]
async fn test_lapsed_subscription_flips_back_to_preview() {
    let store = Arc::new(InMemoryProfileStore::default());
    let granted_until = Utc::now() + Duration::days(30);

    let mut profile = Profile::new_default(3, "Lina".to_string(), "lina@example.com".to_string());
    profile.subscription_tier = Tier::Pro;
    profile.subscription_expiry = Some(granted_until);
    store.upsert(&profile).await.unwrap();

    let lessons = course_lessons();

    // Inside the grant window: full access to released lessons
    let live = evaluate_at(&profile, granted_until - Duration::days(1));
    assert_eq!(live.subscription_tier, Tier::Pro);
    assert!(verdicts(&lessons, live.subscription_tier)[..4]
        .iter()
        .all(|v| v.is_playable()));

    // One day after expiry: demoted on read, preview rules apply again
    let lapsed = evaluate_at(&profile, granted_until + Duration::days(1));
    assert_eq!(lapsed.subscription_tier, Tier::Free);
    assert_eq!(
        verdicts(&lessons, lapsed.subscription_tier)[2],
        LessonAccess::UpgradeRequired
    );

    // Nothing was persisted by evaluation
    let stored = store.fetch(3).await.unwrap().unwrap();
    assert_eq!(stored.subscription_tier, Tier::Pro);
    assert_eq!(stored.subscription_expiry, Some(granted_until));
}

#[tokio::test]
async fn test_owner_email_bypasses_the_gate_entirely() {
    let store = Arc::new(InMemoryProfileStore::default());
    let resolver = IdentityResolver::new(store, vec!["owner@academy.example".to_string()]);

    let profile = resolver
        .resolve(Some(ProviderIdentity {
            id: 4,
            email: "owner@academy.example".to_string(),
            display_name: Some("Owner".to_string()),
            phone: None,
        }))
        .await
        .unwrap()
        .unwrap();

    let tier = evaluate(&profile).subscription_tier;
    assert_eq!(tier, Tier::Pro);

    let lessons = course_lessons();
    let all = verdicts(&lessons, tier);
    assert!(all[..4].iter().all(|v| v.is_playable()));
}

#[tokio::test]
async fn test_progress_survives_entitlement_changes() {
    let store = Arc::new(InMemoryProfileStore::default());
    let profile = Profile::new_default(5, "Sami".to_string(), "sami@example.com".to_string());
    store.upsert(&profile).await.unwrap();

    store.complete_lesson(5, "lesson-0").await.unwrap();
    store.record_quiz_grade(5, "lesson-0", 92).await.unwrap();

    // Entitlement changes must not clobber progress rows
    store
        .set_entitlement(5, Tier::Pro, Some(Utc::now() + Duration::days(30)))
        .await
        .unwrap();
    store.set_entitlement(5, Tier::Free, None).await.unwrap();

    let stored = store.fetch(5).await.unwrap().unwrap();
    assert_eq!(stored.completed_lessons, vec!["lesson-0"]);
    assert_eq!(stored.quiz_grades.get("lesson-0"), Some(&92));
}

#[test]
fn test_malformed_schedule_names_the_missing_field() {
    let payload = json!({
        "semester": "Fall",
        "academic_year": "2026/2027",
        "level": "Level 2",
        // "group" intentionally absent
        "schedule": [{
            "day": "Monday",
            "time": "09:00",
            "course_name": "Adult Nursing",
            "course_code": "NUR201",
            "location": "Hall B",
            "staff": "Dr. Aly"
        }]
    });

    let err = parse_schedule(&payload).unwrap_err();
    match err {
        ScheduleError::MissingField(field) => assert_eq!(field, "group"),
        other => panic!("expected MissingField, got {other:?}"),
    }
}
