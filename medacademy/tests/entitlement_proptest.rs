/// Property-based tests for entitlement evaluation and the lesson gate
/// using proptest
///
/// These tests verify that the expiry-demotion and free-preview rules hold
/// across a wide range of randomly generated profiles and clock offsets.
use chrono::{Duration, TimeZone, Utc};
use medacademy::catalog::Lesson;
use medacademy::entitlement::{
    evaluate_at, is_accessible, lesson_access, LessonAccess, Tier, FREE_PREVIEW_COUNT,
};
use medacademy::identity::Profile;
use proptest::prelude::*;

// Fixed reference clock so offsets stay deterministic
fn reference_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

fn tier_strategy() -> impl Strategy<Value = Tier> {
    prop_oneof![Just(Tier::Free), Just(Tier::Pro)]
}

// Expiry offsets from -2 years to +2 years around the reference clock,
// including the "no expiry" case
fn expiry_strategy() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![Just(None), (-730i64..=730).prop_map(Some)]
}

fn profile_strategy() -> impl Strategy<Value = Profile> {
    (tier_strategy(), expiry_strategy(), 0usize..10).prop_map(|(tier, offset_days, completed)| {
        let mut profile =
            Profile::new_default(1, "Student".to_string(), "student@example.com".to_string());
        profile.subscription_tier = tier;
        profile.subscription_expiry = offset_days.map(|d| reference_now() + Duration::days(d));
        profile.completed_lessons = (0..completed).map(|i| format!("lesson-{i}")).collect();
        profile
    })
}

fn released_lesson() -> Lesson {
    Lesson {
        id: "l1".to_string(),
        title: "Lesson".to_string(),
        duration: "10:00".to_string(),
        is_locked: false,
        contents: Vec::new(),
        quiz: None,
        flashcards: Vec::new(),
    }
}

proptest! {
    #[test]
    fn test_demotion_happens_exactly_when_pro_is_lapsed(profile in profile_strategy()) {
        let now = reference_now();
        let evaluated = evaluate_at(&profile, now);

        let lapsed = profile.subscription_tier == Tier::Pro
            && profile.subscription_expiry.is_some_and(|e| now > e);

        if lapsed {
            prop_assert_eq!(evaluated.subscription_tier, Tier::Free);
        } else {
            prop_assert_eq!(evaluated.subscription_tier, profile.subscription_tier);
        }
    }

    #[test]
    fn test_evaluate_is_idempotent(profile in profile_strategy()) {
        let now = reference_now();
        let once = evaluate_at(&profile, now);
        let twice = evaluate_at(&once, now);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn test_evaluate_only_touches_the_tier(profile in profile_strategy()) {
        let evaluated = evaluate_at(&profile, reference_now());

        prop_assert_eq!(&evaluated.subscription_expiry, &profile.subscription_expiry);
        prop_assert_eq!(&evaluated.completed_lessons, &profile.completed_lessons);
        prop_assert_eq!(&evaluated.name, &profile.name);
        prop_assert_eq!(&evaluated.email, &profile.email);
    }

    #[test]
    fn test_pro_sees_every_released_lesson(index in 0usize..100) {
        prop_assert!(is_accessible(Tier::Pro, index));
        prop_assert_eq!(
            lesson_access(&released_lesson(), index, Tier::Pro),
            LessonAccess::Playable
        );
    }

    #[test]
    fn test_free_access_matches_the_preview_boundary(index in 0usize..100) {
        prop_assert_eq!(is_accessible(Tier::Free, index), index < FREE_PREVIEW_COUNT);
    }

    #[test]
    fn test_unreleased_lesson_dominates_any_tier(tier in tier_strategy(), index in 0usize..100) {
        let mut lesson = released_lesson();
        lesson.is_locked = true;
        prop_assert_eq!(lesson_access(&lesson, index, tier), LessonAccess::NotReleased);
    }

    #[test]
    fn test_playable_implies_released_and_entitled(
        tier in tier_strategy(),
        is_locked in any::<bool>(),
        index in 0usize..100,
    ) {
        let mut lesson = released_lesson();
        lesson.is_locked = is_locked;

        let verdict = lesson_access(&lesson, index, tier);
        if verdict.is_playable() {
            prop_assert!(!is_locked);
            prop_assert!(is_accessible(tier, index));
        }
    }
}
