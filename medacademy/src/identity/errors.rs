//! Identity and profile error types.

use thiserror::Error;

use super::models::UserId;

/// Identity and profile errors
#[derive(Debug, Error)]
pub enum IdentityError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Profile not found
    #[error("Profile not found for user {0}")]
    ProfileNotFound(UserId),

    /// Quiz grade outside 0-100
    #[error("Invalid quiz grade: {0} (must be 0-100)")]
    InvalidGrade(i16),
}

impl IdentityError {
    /// Get a client-safe error message that doesn't leak database internals
    pub fn client_message(&self) -> String {
        match self {
            IdentityError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for identity operations
pub type IdentityResult<T> = Result<T, IdentityError>;
