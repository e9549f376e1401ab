//! Identity resolution: authenticated identity -> canonical student profile.
//!
//! On every authentication-state change the resolver produces the canonical
//! [`Profile`] for the session (or `None` when unauthenticated). Persisted
//! profile fields win over provider-supplied defaults, the configured
//! platform-owner override is applied last, and the resolved record is
//! written back to the durable store asynchronously without blocking the
//! read path.
//!
//! ## Example
//!
//! ```no_run
//! use medacademy::db::{Database, PgProfileStore};
//! use medacademy::identity::{IdentityResolver, ProviderIdentity};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let store = Arc::new(PgProfileStore::new(db.pool().clone()));
//!     let resolver = IdentityResolver::new(store, vec!["owner@academy.example".to_string()]);
//!
//!     let identity = ProviderIdentity {
//!         id: 42,
//!         email: "student@example.com".to_string(),
//!         display_name: Some("Student".to_string()),
//!         phone: None,
//!     };
//!     let profile = resolver.resolve(Some(identity)).await?;
//!     println!("resolved tier: {:?}", profile.map(|p| p.subscription_tier));
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod models;
pub mod resolver;

pub use errors::{IdentityError, IdentityResult};
pub use models::{FALLBACK_DISPLAY_NAME, Profile, ProviderIdentity, UserId};
pub use resolver::IdentityResolver;
