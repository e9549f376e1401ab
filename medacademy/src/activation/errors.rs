//! Activation code error types.

use thiserror::Error;

use crate::identity::UserId;

/// Activation code errors
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Code does not exist
    #[error("Activation code not found")]
    CodeNotFound,

    /// Code has already been redeemed
    #[error("Activation code already used")]
    CodeAlreadyUsed,

    /// Redemption target has no profile
    #[error("Profile not found for user {0}")]
    ProfileNotFound(UserId),

    /// Batch parameters out of range
    #[error("Invalid batch request: {0}")]
    InvalidBatch(String),
}

impl ActivationError {
    /// Get a client-safe error message that doesn't leak database internals
    pub fn client_message(&self) -> String {
        match self {
            ActivationError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for activation code operations
pub type ActivationResult<T> = Result<T, ActivationError>;
