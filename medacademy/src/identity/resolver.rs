//! Identity resolver implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{Duration, Utc};

use super::{
    errors::IdentityResult,
    models::{FALLBACK_DISPLAY_NAME, Profile, ProviderIdentity},
};
use crate::db::ProfileStore;
use crate::entitlement::Tier;

/// Length of the entitlement granted to platform owners on every sign-in.
const OWNER_GRANT_DAYS: i64 = 365 * 10;

/// Identity resolver
///
/// Runs once per authentication-state change and produces the canonical
/// [`Profile`] for the session. The resolver is cheap to clone and safe to
/// share across handlers.
#[derive(Clone)]
pub struct IdentityResolver {
    store: Arc<dyn ProfileStore>,
    owner_emails: Vec<String>,
    loading: Arc<AtomicBool>,
}

/// Clears the loading flag on every exit path, including store errors.
struct LoadingGuard(Arc<AtomicBool>);

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl IdentityResolver {
    /// Create a new identity resolver
    ///
    /// # Arguments
    ///
    /// * `store` - Profile store backing the durable user records
    /// * `owner_emails` - Configured administrator allowlist; a resolved
    ///   email on this list is forced to an effectively unlimited `pro`
    ///   entitlement
    pub fn new(store: Arc<dyn ProfileStore>, owner_emails: Vec<String>) -> Self {
        Self {
            store,
            owner_emails,
            loading: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a resolution is currently in flight
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    /// Resolve an authentication-state change to a canonical profile.
    ///
    /// # Arguments
    ///
    /// * `identity` - Present provider identity, or `None` when the session
    ///   is unauthenticated
    ///
    /// # Returns
    ///
    /// * `IdentityResult<Option<Profile>>` - `None` means "unauthenticated",
    ///   which callers must treat as distinct from "loading"
    ///
    /// # Errors
    ///
    /// * `IdentityError::Database` - Profile fetch failed; the loading flag
    ///   is still cleared
    pub async fn resolve(
        &self,
        identity: Option<ProviderIdentity>,
    ) -> IdentityResult<Option<Profile>> {
        let Some(identity) = identity else {
            return Ok(None);
        };

        self.loading.store(true, Ordering::SeqCst);
        let _guard = LoadingGuard(Arc::clone(&self.loading));

        let persisted = self.store.fetch(identity.id).await?;
        let mut profile = merge(&identity, persisted);
        self.apply_owner_override(&mut profile);

        // Write-through: persist the canonical record without blocking the
        // read path. Failure is logged and the resolution still succeeds.
        let store = Arc::clone(&self.store);
        let canonical = profile.clone();
        tokio::spawn(async move {
            if let Err(e) = store.upsert(&canonical).await {
                log::warn!(
                    "write-through persist failed for user {}: {}",
                    canonical.user_id,
                    e
                );
            }
        });

        Ok(Some(profile))
    }

    /// Platform-owner override: an explicit, named rule rather than a
    /// condition buried in merge logic, so the privilege escalation stays
    /// auditable and configuration-driven.
    fn apply_owner_override(&self, profile: &mut Profile) {
        if self
            .owner_emails
            .iter()
            .any(|owner| owner == &profile.email)
        {
            profile.subscription_tier = Tier::Pro;
            profile.subscription_expiry = Some(Utc::now() + Duration::days(OWNER_GRANT_DAYS));
        }
    }
}

/// Merge a persisted profile with provider-supplied defaults.
///
/// Precedence per field: persisted value > provider value > fallback.
fn merge(identity: &ProviderIdentity, persisted: Option<Profile>) -> Profile {
    let provider_name = identity
        .display_name
        .clone()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| FALLBACK_DISPLAY_NAME.to_string());
    let provider_phone = identity.phone.clone().unwrap_or_default();

    match persisted {
        Some(stored) => Profile {
            user_id: identity.id,
            name: if stored.name.is_empty() { provider_name } else { stored.name },
            email: if stored.email.is_empty() {
                identity.email.clone()
            } else {
                stored.email
            },
            phone: if stored.phone.is_empty() { provider_phone } else { stored.phone },
            subscription_tier: stored.subscription_tier,
            subscription_expiry: stored.subscription_expiry,
            completed_lessons: stored.completed_lessons,
            quiz_grades: stored.quiz_grades,
        },
        None => {
            let mut profile =
                Profile::new_default(identity.id, provider_name, identity.email.clone());
            profile.phone = provider_phone;
            profile
        }
    }
}
