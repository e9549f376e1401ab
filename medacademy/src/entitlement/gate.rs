//! Per-lesson content access gate.
//!
//! Two independent checks control playability:
//!
//! 1. The instructor's release flag (`is_locked`), which hides content that
//!    has not been published yet, regardless of tier.
//! 2. The subscription gate: `pro` students see everything, free students see
//!    the first [`FREE_PREVIEW_COUNT`] lessons of each course.
//!
//! A denial never hides the lesson itself. Titles and metadata stay visible
//! and the API returns an explicit [`LessonAccess`] verdict so the client can
//! render an upgrade prompt instead of an empty slot.

use crate::catalog::Lesson;
use crate::entitlement::Tier;

/// Number of leading lessons in every course that free students can play.
pub const FREE_PREVIEW_COUNT: usize = 2;

/// Access verdict for a single lesson
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonAccess {
    /// Released and within the student's entitlement
    Playable,
    /// Not yet released by the instructor; locked for every tier
    NotReleased,
    /// Released, but past the free preview boundary for a free student
    UpgradeRequired,
}

impl LessonAccess {
    /// Whether the lesson content may be played or downloaded
    pub fn is_playable(self) -> bool {
        matches!(self, LessonAccess::Playable)
    }
}

/// Subscription check only: is the lesson at `index` within the entitlement?
///
/// The release flag is deliberately not consulted here; it is an
/// author-controlled concern checked separately by [`lesson_access`].
pub fn is_accessible(tier: Tier, index: usize) -> bool {
    tier.is_pro() || index < FREE_PREVIEW_COUNT
}

/// Combined verdict for a lesson at position `index` in its course.
///
/// `tier` must already be normalized by [`crate::entitlement::evaluate`];
/// passing a raw persisted tier would let lapsed subscriptions through.
pub fn lesson_access(lesson: &Lesson, index: usize, tier: Tier) -> LessonAccess {
    if lesson.is_locked {
        return LessonAccess::NotReleased;
    }
    if is_accessible(tier, index) {
        LessonAccess::Playable
    } else {
        LessonAccess::UpgradeRequired
    }
}
