//! Expiry-aware entitlement evaluation.
//!
//! Evaluation is pure and idempotent: it is recomputed on every read and is
//! never written back to storage. Callers that cache profiles must re-run
//! [`evaluate`] before trusting the tier.

use chrono::{DateTime, Utc};

use crate::identity::Profile;

/// Normalize a profile's entitlement against the current clock.
///
/// # Arguments
///
/// * `profile` - Profile as read from storage or the resolver
///
/// # Returns
///
/// * `Profile` - Copy with a lapsed `pro` tier demoted to `free`
pub fn evaluate(profile: &Profile) -> Profile {
    evaluate_at(profile, Utc::now())
}

/// Normalize a profile's entitlement against an explicit clock.
///
/// Rules:
/// - Non-`pro` profiles pass through unchanged.
/// - `pro` with an expiry in the past is demoted to `free`. The expiry field
///   is left in place; callers must not rely on it being cleared.
/// - `pro` with no expiry is left as `pro`. Outside the owner override this
///   is an anomalous record; see DESIGN.md before changing it.
pub fn evaluate_at(profile: &Profile, now: DateTime<Utc>) -> Profile {
    if !profile.subscription_tier.is_pro() {
        return profile.clone();
    }

    match profile.subscription_expiry {
        Some(expiry) if now > expiry => {
            let mut demoted = profile.clone();
            demoted.subscription_tier = crate::entitlement::Tier::Free;
            demoted
        }
        _ => profile.clone(),
    }
}
