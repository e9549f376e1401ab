//! # MedAcademy
//!
//! Core library for a nursing-education platform: courses with ordered video
//! and document lessons, student profiles with progress tracking, and a
//! manually administered `free`/`pro` subscription model.
//!
//! The interesting policy surface lives in three places:
//!
//! - [`identity`]: maps an authenticated identity to a canonical student
//!   profile, merging persisted fields with provider defaults and applying
//!   the configured platform-owner override.
//! - [`entitlement`]: decides whether a `pro` subscription is still live
//!   (expiry-aware, recomputed on every read) and gates individual lessons
//!   behind the free-preview boundary.
//! - [`activation`]: admin-issued single-use codes that grant a fixed-length
//!   `pro` subscription, with exactly-once redemption enforced at the
//!   database layer.
//!
//! ## Core Modules
//!
//! - [`auth`]: account registration, login, and JWT session management
//! - [`catalog`]: course/lesson storage with validated documents
//! - [`schedule`]: admin-curated academic schedules (validated JSON)
//! - [`uploads`]: two-phase course asset uploads to a blob store

/// Account registration, login, and session management.
pub mod auth;

/// Admin-issued activation codes granting timed `pro` subscriptions.
pub mod activation;

/// Course and lesson catalog backed by the durable store.
pub mod catalog;

/// Database connection pooling and repository traits.
pub mod db;

/// Expiry-aware entitlement evaluation and lesson gating.
pub mod entitlement;

/// Identity resolution: provider identity -> canonical student profile.
pub mod identity;

/// Academic schedule ingestion and storage.
pub mod schedule;

/// Two-phase course asset uploads.
pub mod uploads;

pub use entitlement::{FREE_PREVIEW_COUNT, Tier, evaluate, gate};
pub use identity::{IdentityResolver, Profile, ProviderIdentity};
