//! Entitlement evaluation and content gating.
//!
//! A student's access right is derived from two persisted fields: the
//! subscription tier (`free` or `pro`) and an optional expiry timestamp.
//! [`evaluate`] normalizes a profile on every read, demoting lapsed `pro`
//! subscriptions without touching storage. [`gate`] then decides per-lesson
//! access from the normalized tier, the lesson's position in the curriculum,
//! and the instructor's release flag.
//!
//! ## Example
//!
//! ```
//! use medacademy::entitlement::{Tier, gate};
//!
//! // Free students get the first two lessons of every course.
//! assert!(gate::is_accessible(Tier::Free, 0));
//! assert!(gate::is_accessible(Tier::Free, 1));
//! assert!(!gate::is_accessible(Tier::Free, 2));
//! assert!(gate::is_accessible(Tier::Pro, 2));
//! ```

pub mod evaluator;
pub mod gate;
pub mod models;

pub use evaluator::{evaluate, evaluate_at};
pub use gate::{FREE_PREVIEW_COUNT, LessonAccess, is_accessible, lesson_access};
pub use models::Tier;
