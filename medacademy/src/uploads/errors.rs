//! Upload error types.

use thiserror::Error;

/// Upload errors
#[derive(Debug, Error)]
pub enum UploadError {
    /// Blob store I/O failure
    #[error("Storage error: {0}")]
    Io(#[from] std::io::Error),

    /// Unusable file name
    #[error("Invalid file name: {0}")]
    InvalidFileName(String),

    /// State machine misuse: the asset already left `Pending`
    #[error("Upload already resolved to {0}")]
    AlreadyResolved(&'static str),
}

impl UploadError {
    /// Get a client-safe error message that doesn't leak filesystem paths
    pub fn client_message(&self) -> String {
        match self {
            UploadError::Io(_) => "Upload failed, please try again".to_string(),
            _ => self.to_string(),
        }
    }
}

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;
