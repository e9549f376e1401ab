//! Authentication module providing account registration, login, and session
//! management.
//!
//! This is the platform's identity provider: it owns credentials and issues
//! the authenticated identity that [`crate::identity::IdentityResolver`]
//! turns into a canonical student profile. It implements:
//! - Argon2id password hashing with a server-side pepper
//! - JWT access tokens (15-minute expiry)
//! - Rotating refresh tokens (7-day expiry)
//!
//! ## Example
//!
//! ```no_run
//! use medacademy::auth::{AuthManager, RegisterRequest};
//! use medacademy::db::Database;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&Default::default()).await?;
//!     let auth = AuthManager::new(
//!         Arc::new(db.pool().clone()),
//!         "secret_pepper".to_string(),
//!         "jwt_secret".to_string(),
//!         vec![],
//!     );
//!
//!     let request = RegisterRequest {
//!         email: "student@example.com".to_string(),
//!         password: "SecurePass123".to_string(),
//!         display_name: "Student One".to_string(),
//!         phone: None,
//!     };
//!
//!     let user = auth.register(request).await?;
//!     println!("Registered user: {}", user.email);
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{AuthError, AuthResult};
pub use manager::AuthManager;
pub use models::{
    AccessTokenClaims, LoginRequest, RegisterRequest, Session, SessionTokens, User,
};
