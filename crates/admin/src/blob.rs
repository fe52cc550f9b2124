//! Blob store seam for binary objects such as banner images.

use async_trait::async_trait;
use thiserror::Error;

/// Prefix under which banner images are stored.
pub const BANNER_IMAGE_PREFIX: &str = "banner_images";

/// Errors returned by a [`BlobStore`].
#[derive(Debug, Error)]
pub enum BlobError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The store rejected the credentials.
    #[error("unauthorized")]
    Unauthorized,

    /// Failed to parse the store's response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Store unavailable (used by in-memory fakes).
    #[error("blob store unavailable")]
    Unavailable,
}

/// Path-addressed binary object storage with download URLs.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Upload `bytes` to `path` and return a download URL for it.
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError>;

    /// Delete the object at `path`. Deleting a missing object succeeds.
    async fn delete(&self, path: &str) -> Result<(), BlobError>;
}

/// Recover the object path from a download URL.
///
/// Download URLs have the form `.../o/{percent-encoded path}?alt=media&token=...`.
/// Returns `None` if the URL has no `/o/` segment or the path is empty.
#[must_use]
pub fn storage_path_from_download_url(download_url: &str) -> Option<String> {
    let without_query = download_url.split(['?', '#']).next()?;
    let (_, encoded) = without_query.split_once("/o/")?;
    if encoded.is_empty() {
        return None;
    }
    let decoded = urlencoding::decode(encoded).ok()?;
    Some(decoded.into_owned())
}

/// Make an uploaded file name safe to use as a path segment.
#[must_use]
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "image".to_string()
    } else {
        cleaned.to_string()
    }
}

/// Blob path for a banner image uploaded at `millis`.
#[must_use]
pub fn banner_image_path(millis: i64, file_name: &str) -> String {
    format!(
        "{BANNER_IMAGE_PREFIX}/{millis}_{}",
        sanitize_file_name(file_name)
    )
}
