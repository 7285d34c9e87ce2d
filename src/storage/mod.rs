//! Object storage layer (S3-compatible)
//!
//! Handlers only see the [`ObjectStore`] trait; [`S3Storage`] is the MinIO /
//! S3 implementation used by the binary.

use async_trait::async_trait;
use bytes::Bytes;

#[cfg(test)]
pub mod memory;
pub mod s3_client;

pub use s3_client::S3Storage;

/// Lifetime of the download links returned by uploads.
pub const PRESIGN_EXPIRY_SECS: u32 = 7 * 24 * 60 * 60;

/// Extensions accepted for upload, compared exactly.
pub const ALLOWED_EXTENSIONS: [&str; 3] = [".jpg", ".jpeg", ".png"];

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid storage credentials: {0}")]
    Credentials(String),

    #[error("storage backend error: {0}")]
    Backend(#[from] s3::error::S3Error),

    #[error("failed to sign download URL for {key}: {reason}")]
    Presign { key: String, reason: String },
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

/// Result of a successful upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
}

/// A fetched object, fully buffered.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub bytes: Bytes,
    pub last_modified: Option<String>,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under a freshly generated key derived from
    /// `original_filename` and return the key with a pre-signed GET URL.
    async fn put(
        &self,
        data: Bytes,
        original_filename: &str,
        content_type: Option<&str>,
    ) -> StorageResult<StoredObject>;

    /// Fetch the whole object. Missing keys yield [`StorageError::NotFound`].
    async fn get(&self, key: &str) -> StorageResult<ObjectData>;
}

/// Extension of the final path component, dot included.
///
/// Both `/` and `\` count as separators since browsers on Windows may send
/// full client paths as the multipart filename.
pub fn file_extension(filename: &str) -> Option<&str> {
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    name.rfind('.').map(|idx| &name[idx..]).filter(|ext| ext.len() > 1)
}

pub fn is_allowed_extension(ext: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&ext)
}

/// Fresh object key: a random UUID followed by the extension of the original
/// filename. The filename itself is discarded.
pub fn object_key(original_filename: &str) -> String {
    let ext = file_extension(original_filename).unwrap_or_default();
    format!("{}{}", uuid::Uuid::new_v4(), ext)
}

/// MIME type guessed from a key or filename, falling back to
/// `application/octet-stream`.
pub fn content_type_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.essence_str().to_string())
}
