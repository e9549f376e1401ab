//! Catalog error types.

use thiserror::Error;
use uuid::Uuid;

/// Catalog errors
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Course not found (expected absence, rendered as a friendly 404)
    #[error("Course not found: {0}")]
    CourseNotFound(Uuid),

    /// Stored lesson document failed validation
    #[error("Invalid course document: {0}")]
    InvalidDocument(String),
}

impl CatalogError {
    /// Get a client-safe error message that doesn't leak database internals
    pub fn client_message(&self) -> String {
        match self {
            CatalogError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
