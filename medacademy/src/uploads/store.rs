//! Blob store trait and filesystem implementation.

use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;

use super::errors::{UploadError, UploadResult};
use super::models::{DEFAULT_CONTENT_TYPE, UploadState};
use crate::catalog::CourseId;

/// Trait for blob storage backends
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store bytes under `path` with an explicit content type, returning the
    /// public URL of the stored object
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> UploadResult<String>;
}

/// Filesystem-backed blob store serving files from a public base URL
pub struct FsBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl FsBlobStore {
    /// Create a new filesystem blob store
    ///
    /// # Arguments
    ///
    /// * `root` - Directory files are written under
    /// * `public_base_url` - URL prefix the files are served from
    pub fn new(root: PathBuf, public_base_url: String) -> Self {
        Self {
            root,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn put(&self, path: &str, bytes: &[u8], content_type: &str) -> UploadResult<String> {
        let full_path = self.root.join(path);
        if let Some(parent) = full_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full_path, bytes).await?;
        // Content type travels in a sidecar so the file server can set the
        // header instead of guessing from the extension.
        tokio::fs::write(full_path.with_extension("ctype"), content_type).await?;

        Ok(format!("{}/{}", self.public_base_url, path))
    }
}

/// Upload manager
///
/// Drives the per-asset state machine against a [`BlobStore`], namespacing
/// object paths by course id and upload timestamp.
#[derive(Clone)]
pub struct UploadManager {
    store: Arc<dyn BlobStore>,
}

impl UploadManager {
    /// Create a new upload manager
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Upload one course asset.
    ///
    /// # Arguments
    ///
    /// * `course_id` - Course the asset belongs to
    /// * `file_name` - Client-declared file name (sanitized here)
    /// * `content_type` - Client-declared MIME type, if any
    /// * `bytes` - File content
    ///
    /// # Returns
    ///
    /// * `UploadResult<UploadState>` - `Committed` with the public URL, or
    ///   `Failed` with the reason (store errors are captured in the state,
    ///   not propagated, so callers can render the failed entry)
    pub async fn upload_course_asset(
        &self,
        course_id: CourseId,
        file_name: &str,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> UploadResult<UploadState> {
        let safe_name = sanitize_file_name(file_name)?;
        let declared_type = content_type.unwrap_or(DEFAULT_CONTENT_TYPE);
        let pending = UploadState::pending(safe_name.clone(), content_type, bytes.len());

        let path = format!(
            "courses/{}/{}_{}",
            course_id,
            Utc::now().timestamp_millis(),
            safe_name
        );

        match self.store.put(&path, bytes, declared_type).await {
            Ok(url) => pending.commit(url),
            Err(e) => {
                log::warn!("upload of {path} failed: {e}");
                pending.fail(e.client_message())
            }
        }
    }
}

/// Reject names that could escape the course namespace
fn sanitize_file_name(file_name: &str) -> UploadResult<String> {
    let trimmed = file_name.trim();
    if trimmed.is_empty()
        || trimmed.contains('/')
        || trimmed.contains('\\')
        || trimmed.contains("..")
    {
        return Err(UploadError::InvalidFileName(file_name.to_string()));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn temp_store() -> (FsBlobStore, PathBuf) {
        let dir = std::env::temp_dir().join(format!("medacademy_uploads_{}", Uuid::new_v4()));
        (
            FsBlobStore::new(dir.clone(), "https://cdn.academy.example".to_string()),
            dir,
        )
    }

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let (store, dir) = temp_store();
        let url = store
            .put("courses/c1/notes.pdf", b"pdf bytes", "application/pdf")
            .await
            .unwrap();

        assert_eq!(url, "https://cdn.academy.example/courses/c1/notes.pdf");
        let written = std::fs::read(dir.join("courses/c1/notes.pdf")).unwrap();
        assert_eq!(written, b"pdf bytes");
        let ctype = std::fs::read_to_string(dir.join("courses/c1/notes.ctype")).unwrap();
        assert_eq!(ctype, "application/pdf");

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_upload_commits_with_namespaced_url() {
        let (store, dir) = temp_store();
        let manager = UploadManager::new(Arc::new(store));
        let course_id = Uuid::new_v4();

        let state = manager
            .upload_course_asset(course_id, "lecture.mp4", Some("video/mp4"), b"vid")
            .await
            .unwrap();

        match state {
            UploadState::Committed { url } => {
                assert!(url.contains(&course_id.to_string()));
                assert!(url.ends_with("lecture.mp4"));
            }
            other => panic!("expected committed, got {other:?}"),
        }

        let _ = std::fs::remove_dir_all(dir);
    }

    #[tokio::test]
    async fn test_traversal_file_name_rejected() {
        let (store, dir) = temp_store();
        let manager = UploadManager::new(Arc::new(store));

        let err = manager
            .upload_course_asset(Uuid::new_v4(), "../../etc/passwd", None, b"x")
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidFileName(_)));

        let _ = std::fs::remove_dir_all(dir);
    }
}
