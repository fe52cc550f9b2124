//! Realtime database REST client.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::instrument;
use url::Url;

use super::{body_text, http_client, send, truncate_body};
use crate::config::FirebaseConfig;
use crate::db::{DocumentStore, StoreError};

/// Client for the realtime database REST API.
#[derive(Clone)]
pub struct RealtimeDatabase {
    inner: Arc<RealtimeDatabaseInner>,
}

struct RealtimeDatabaseInner {
    client: reqwest::Client,
    base_url: String,
    secret: SecretString,
}

impl RealtimeDatabase {
    /// Create a new database client.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &FirebaseConfig) -> Result<Self, StoreError> {
        Ok(Self {
            inner: Arc::new(RealtimeDatabaseInner {
                client: http_client()?,
                base_url: config.database_url.trim_end_matches('/').to_string(),
                secret: config.database_secret.clone(),
            }),
        })
    }

    /// REST URL of a path: `{base}/{path}.json?auth={secret}`.
    ///
    /// Each `/`-separated segment is percent-encoded, so keys holding `?`,
    /// `#` or `%` address the record they name.
    fn url(&self, path: &str) -> Result<Url, StoreError> {
        let path = path.trim_matches('/');
        let (parent, leaf) = path.rsplit_once('/').unwrap_or(("", path));

        let mut url = Url::parse(&self.inner.base_url)
            .map_err(|e| StoreError::InvalidPath(format!("{path}: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::InvalidPath(format!("{path}: base URL cannot hold a path"))
            })?
            .pop_if_empty()
            .extend(parent.split('/').filter(|segment| !segment.is_empty()))
            .push(&format!("{leaf}.json"));
        url.query_pairs_mut()
            .append_pair("auth", self.inner.secret.expose_secret());
        Ok(url)
    }

    /// Map a non-success response to a `StoreError`.
    async fn parse_error(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            return StoreError::Unauthorized;
        }

        // Error bodies look like {"error": "Permission denied"}
        let body = body_text(response).await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| truncate_body(&body));

        StoreError::Api { status, message }
    }

    /// Check the response status, discarding the body on success.
    async fn expect_success(response: reqwest::Response) -> Result<(), StoreError> {
        if response.status().is_success() {
            return Ok(());
        }
        Err(Self::parse_error(response).await)
    }
}

#[async_trait]
impl DocumentStore for RealtimeDatabase {
    #[instrument(skip(self))]
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let response = send(self.inner.client.get(self.url(path)?)).await?;
        if !response.status().is_success() {
            return Err(Self::parse_error(response).await);
        }

        let body = body_text(response).await?;
        let value: Value = serde_json::from_str(&body)
            .map_err(|e| StoreError::Parse(format!("Failed to parse response: {e}")))?;
        Ok((!value.is_null()).then_some(value))
    }

    #[instrument(skip(self, value))]
    async fn set(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        let response = send(self.inner.client.put(self.url(path)?).json(value)).await?;
        Self::expect_success(response).await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, path: &str, patch: &Value) -> Result<(), StoreError> {
        let response = send(self.inner.client.patch(self.url(path)?).json(patch)).await?;
        Self::expect_success(response).await
    }

    #[instrument(skip(self))]
    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        let response = send(self.inner.client.delete(self.url(path)?)).await?;
        Self::expect_success(response).await
    }
}

impl std::fmt::Debug for RealtimeDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeDatabase")
            .field("base_url", &self.inner.base_url)
            .finish_non_exhaustive()
    }
}
