//! Document store access for the admin.
//!
//! # Layout
//!
//! All marketplace state lives in a hosted JSON tree addressed by
//! slash-delimited paths:
//!
//! - `users/{id}` - marketplace users
//! - `companies/{id}/services/{id}/reviews/{id}` - companies, services, reviews
//! - `bookings/{id}` - service bookings
//! - `messages/{id}` - customer contact messages
//! - `banners/{id}` - promotional banners (images live in the blob store)
//! - `faqs/{category}/{index}` - FAQ lists
//! - `accounts/{id}` - admin account records
//!
//! Records are created at client-generated push keys (see [`push_key`]).

pub mod push_key;
pub mod repository;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

use taskmaster_core::KeyError;

pub use repository::{Entity, Records, Repository};

/// Errors returned by a [`DocumentStore`].
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store rejected the request.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The store rejected the credentials.
    #[error("permission denied")]
    Unauthorized,

    /// The path could not be turned into a request URL.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// The response body was not valid JSON.
    #[error("parse error: {0}")]
    Parse(String),

    /// Store unavailable (used by in-memory fakes).
    #[error("store unavailable")]
    Unavailable,
}

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The underlying store call failed.
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// A record could not be encoded for writing.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A generated or supplied key is not a valid path segment.
    #[error("invalid key: {0}")]
    InvalidKey(#[from] KeyError),

    /// Data in the store has an unexpected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

/// A hosted JSON tree addressed by slash-delimited paths.
///
/// Semantics follow the realtime database REST API: `set` replaces the
/// value at a path, `update` merges the members of an object into it (a
/// `null` member deletes that child), and writing `null` or removing the
/// last child of a node deletes the node.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Read the value at `path`. Absent paths yield `None`.
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError>;

    /// Replace the value at `path`.
    async fn set(&self, path: &str, value: &Value) -> Result<(), StoreError>;

    /// Merge the members of `patch` (an object) into the value at `path`.
    async fn update(&self, path: &str, patch: &Value) -> Result<(), StoreError>;

    /// Delete the value at `path`. Deleting an absent path succeeds.
    async fn remove(&self, path: &str) -> Result<(), StoreError>;
}

/// Join path segments into a store path.
#[must_use]
pub fn child_path(parent: &str, child: &str) -> String {
    let parent = parent.trim_matches('/');
    if parent.is_empty() {
        child.trim_matches('/').to_string()
    } else {
        format!("{parent}/{}", child.trim_matches('/'))
    }
}

/// Iterate the children of a collection node.
///
/// The store returns index-keyed collections as JSON arrays, with `null`
/// in place of deleted entries. Both shapes are flattened to
/// `(key, value)` pairs here; `null` children are skipped.
#[must_use]
pub fn children(node: Value) -> Vec<(String, Value)> {
    match node {
        Value::Object(map) => map.into_iter().filter(|(_, v)| !v.is_null()).collect(),
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v))
            .collect(),
        Value::Null => Vec::new(),
        other => {
            tracing::warn!(value = %other, "Expected a collection node, found a scalar");
            Vec::new()
        }
    }
}
