//! Cloud storage REST client for banner images.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;

use super::{body_text, http_client, send, truncate_body};
use crate::blob::{BlobError, BlobStore};
use crate::config::FirebaseConfig;

/// Storage REST API base URL.
const BASE_URL: &str = "https://firebasestorage.googleapis.com/v0/b";

/// Object metadata returned by an upload.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ObjectMetadata {
    name: String,
    /// Comma-separated download tokens.
    #[serde(default)]
    download_tokens: Option<String>,
}

/// Client for the storage REST API.
#[derive(Clone)]
pub struct CloudStorage {
    inner: Arc<CloudStorageInner>,
}

struct CloudStorageInner {
    client: reqwest::Client,
    bucket: String,
    token: Option<SecretString>,
}

impl CloudStorage {
    /// Create a new storage client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, BlobError> {
        Ok(Self {
            inner: Arc::new(CloudStorageInner {
                client: http_client()?,
                bucket: config.storage_bucket.clone(),
                token: config.storage_token.clone(),
            }),
        })
    }

    /// URL of the bucket's object collection.
    fn objects_url(&self) -> String {
        format!("{BASE_URL}/{}/o", self.inner.bucket)
    }

    /// URL of a single object, with the path encoded as one segment.
    fn object_url(&self, path: &str) -> String {
        format!("{}/{}", self.objects_url(), urlencoding::encode(path))
    }

    /// Public download URL of an object.
    fn download_url(&self, path: &str, token: Option<&str>) -> String {
        let mut url = format!("{}?alt=media", self.object_url(path));
        if let Some(token) = token {
            url.push_str("&token=");
            url.push_str(&urlencoding::encode(token));
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.inner.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret())),
            None => request,
        }
    }

    async fn parse_error(response: reqwest::Response) -> BlobError {
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return BlobError::Unauthorized;
        }
        let body = body_text(response).await.unwrap_or_default();
        BlobError::Api {
            status,
            message: truncate_body(&body),
        }
    }
}

#[async_trait]
impl BlobStore for CloudStorage {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError> {
        let url = format!("{}?name={}", self.objects_url(), urlencoding::encode(path));
        let request = self
            .inner
            .client
            .post(url)
            .header(CONTENT_TYPE, content_type)
            .body(bytes);
        let response = send(self.authorize(request)).await?;
        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let body = body_text(response).await?;
        let metadata: ObjectMetadata = serde_json::from_str(&body)
            .map_err(|e| BlobError::Parse(format!("Failed to parse upload response: {e}")))?;
        let token = metadata
            .download_tokens
            .as_deref()
            .and_then(|t| t.split(',').next())
            .filter(|t| !t.is_empty());

        tracing::info!(object = %metadata.name, "Uploaded object");
        Ok(self.download_url(&metadata.name, token))
    }

    #[instrument(skip(self))]
    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        let request = self.inner.client.delete(self.object_url(path));
        let response = send(self.authorize(request)).await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            tracing::warn!(path, "Object already deleted");
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }
}

impl std::fmt::Debug for CloudStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudStorage")
            .field("bucket", &self.inner.bucket)
            .finish_non_exhaustive()
    }
}
