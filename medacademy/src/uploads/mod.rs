//! Course asset uploads.
//!
//! Uploads are modeled as an explicit two-phase state machine per asset:
//! `Pending` (local metadata only) transitions to exactly one of `Committed`
//! (the blob store accepted the bytes and returned a public URL) or `Failed`
//! (the reason is kept for the admin). The blob store itself is behind a
//! trait so tests run against a local directory.

pub mod errors;
pub mod models;
pub mod store;

pub use errors::{UploadError, UploadResult};
pub use models::{DEFAULT_CONTENT_TYPE, UploadState};
pub use store::{BlobStore, FsBlobStore, UploadManager};
