//! Schedule error types.

use thiserror::Error;

/// Schedule errors
#[derive(Debug, Error)]
pub enum ScheduleError {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Required top-level field absent from the payload
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Required field absent from a schedule entry
    #[error("missing required field: schedule[{index}].{field}")]
    MissingEntryField { index: usize, field: &'static str },

    /// Payload is not structurally valid JSON for a schedule
    #[error("malformed schedule document: {0}")]
    Malformed(String),

    /// No schedule stored for this level/group
    #[error("Schedule not found for level {level}, group {group}")]
    ScheduleNotFound { level: String, group: String },
}

impl ScheduleError {
    /// Get a client-safe error message that doesn't leak database internals
    pub fn client_message(&self) -> String {
        match self {
            ScheduleError::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for schedule operations
pub type ScheduleResult<T> = Result<T, ScheduleError>;
