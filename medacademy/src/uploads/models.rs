//! Upload state machine.

use serde::{Deserialize, Serialize};

use super::errors::{UploadError, UploadResult};

/// Content type used when the client declares none
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Per-asset upload state
///
/// `Pending` is the only state with outgoing transitions; `Committed` and
/// `Failed` are terminal. The UI renders the optimistic `Pending` entry
/// immediately and reconciles it when the upload resolves.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum UploadState {
    Pending {
        file_name: String,
        content_type: String,
        size: usize,
    },
    Committed {
        url: String,
    },
    Failed {
        reason: String,
    },
}

impl UploadState {
    /// Start an upload with the declared local metadata
    pub fn pending(file_name: String, content_type: Option<&str>, size: usize) -> Self {
        UploadState::Pending {
            file_name,
            content_type: content_type.unwrap_or(DEFAULT_CONTENT_TYPE).to_string(),
            size,
        }
    }

    /// Resolve a pending upload with the public URL
    pub fn commit(self, url: String) -> UploadResult<Self> {
        match self {
            UploadState::Pending { .. } => Ok(UploadState::Committed { url }),
            other => Err(UploadError::AlreadyResolved(other.name())),
        }
    }

    /// Resolve a pending upload with a failure reason
    pub fn fail(self, reason: String) -> UploadResult<Self> {
        match self {
            UploadState::Pending { .. } => Ok(UploadState::Failed { reason }),
            other => Err(UploadError::AlreadyResolved(other.name())),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            UploadState::Pending { .. } => "pending",
            UploadState::Committed { .. } => "committed",
            UploadState::Failed { .. } => "failed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_commits_once() {
        let state = UploadState::pending("notes.pdf".to_string(), Some("application/pdf"), 1024);
        let committed = state.commit("https://cdn/notes.pdf".to_string()).unwrap();
        assert_eq!(
            committed,
            UploadState::Committed { url: "https://cdn/notes.pdf".to_string() }
        );

        let err = committed.commit("https://cdn/other.pdf".to_string()).unwrap_err();
        assert!(matches!(err, UploadError::AlreadyResolved("committed")));
    }

    #[test]
    fn test_pending_can_fail_instead() {
        let state = UploadState::pending("x.mp4".to_string(), None, 10);
        let failed = state.fail("network".to_string()).unwrap();
        assert!(matches!(failed, UploadState::Failed { .. }));
        assert!(failed.fail("again".to_string()).is_err());
    }

    #[test]
    fn test_missing_content_type_falls_back_to_binary() {
        let state = UploadState::pending("blob".to_string(), None, 1);
        match state {
            UploadState::Pending { content_type, .. } => {
                assert_eq!(content_type, DEFAULT_CONTENT_TYPE);
            }
            _ => unreachable!(),
        }
    }
}
