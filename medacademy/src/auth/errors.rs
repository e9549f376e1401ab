//! Authentication error types.

use thiserror::Error;

/// Authentication errors
///
/// Each variant maps to a distinct user-facing message; the API layer must
/// not collapse them into a generic failure.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Password hashing failed
    #[error("Password hashing failed")]
    HashingFailed,

    /// Password verification failed
    #[error("Invalid email or password")]
    InvalidPassword,

    /// Account not found
    #[error("No account exists for this email")]
    UserNotFound,

    /// Duplicate registration
    #[error("An account already exists for this email")]
    EmailTaken,

    /// Email format invalid
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),

    /// Password too weak
    #[error("Password too weak: {0}")]
    WeakPassword(String),

    /// JWT token error
    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    /// Session expired
    #[error("Session expired, please sign in again")]
    SessionExpired,

    /// Invalid refresh token
    #[error("Invalid refresh token")]
    InvalidRefreshToken,

    /// Rate limited
    #[error("Too many attempts, please try again later")]
    RateLimited,
}

impl AuthError {
    /// Get a client-safe error message that doesn't leak sensitive
    /// information about the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            AuthError::Database(_) => "Internal server error".to_string(),
            AuthError::JwtError(_) => "Authentication failed".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for authentication operations
pub type AuthResult<T> = Result<T, AuthError>;
