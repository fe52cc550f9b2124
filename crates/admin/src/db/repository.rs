//! Generic keyed-collection repository over a [`DocumentStore`].

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use taskmaster_core::RecordKey;

use super::{DocumentStore, RepositoryError, child_path, children, push_key};

/// A collection loaded from the store, ordered by key.
///
/// Push keys are time-ordered, so this is also creation order.
pub type Records<E> = BTreeMap<<E as Entity>::Key, E>;

/// A record type stored as a keyed collection under one path.
pub trait Entity: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Key type identifying records of this entity.
    type Key: RecordKey + Serialize;

    /// Collection path in the store (e.g. `"bookings"`).
    const COLLECTION: &'static str;

    /// Fields matched by the free-text filter.
    fn search_fields<'a>(&'a self, key: &'a Self::Key) -> Vec<&'a str>;
}

/// Repository for one entity collection.
pub struct Repository<'a, E: Entity> {
    store: &'a dyn DocumentStore,
    _entity: PhantomData<fn() -> E>,
}

impl<'a, E: Entity> Repository<'a, E> {
    /// Create a new repository.
    #[must_use]
    pub const fn new(store: &'a dyn DocumentStore) -> Self {
        Self {
            store,
            _entity: PhantomData,
        }
    }

    /// Store path of a single record.
    #[must_use]
    pub fn path(key: &E::Key) -> String {
        child_path(E::COLLECTION, key.as_str())
    }

    /// Generate a fresh key for a record about to be created.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::InvalidKey` if the generated key is rejected.
    pub fn next_key() -> Result<E::Key, RepositoryError> {
        Ok(E::Key::parse(&push_key::generate())?)
    }

    /// Load the entire collection.
    ///
    /// An absent collection is empty. Records whose key or body cannot be
    /// decoded are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails.
    #[tracing::instrument(skip(self), fields(collection = E::COLLECTION))]
    pub async fn list(&self) -> Result<Records<E>, RepositoryError> {
        let Some(node) = self.store.read(E::COLLECTION).await? else {
            return Ok(Records::<E>::new());
        };

        let mut records = Records::<E>::new();
        for (raw_key, value) in children(node) {
            let key = match E::Key::parse(&raw_key) {
                Ok(key) => key,
                Err(e) => {
                    tracing::warn!(key = %raw_key, error = %e, "Skipping record with invalid key");
                    continue;
                }
            };
            match serde_json::from_value::<E>(value) {
                Ok(record) => {
                    records.insert(key, record);
                }
                Err(e) => {
                    tracing::warn!(key = %raw_key, error = %e, "Skipping undecodable record");
                }
            }
        }

        tracing::debug!(count = records.len(), "Collection loaded");
        Ok(records)
    }

    /// Load a single record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the read fails, or
    /// `RepositoryError::DataCorruption` if the record cannot be decoded.
    pub async fn get(&self, key: &E::Key) -> Result<Option<E>, RepositoryError> {
        let Some(value) = self.store.read(&Self::path(key)).await? else {
            return Ok(None);
        };
        serde_json::from_value(value)
            .map(Some)
            .map_err(|e| RepositoryError::DataCorruption(format!("{}/{key}: {e}", E::COLLECTION)))
    }

    /// Create a record at a fresh push key.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if encoding or the write fails.
    pub async fn create(&self, record: &E) -> Result<E::Key, RepositoryError> {
        let key = Self::next_key()?;
        self.set(&key, record).await?;
        Ok(key)
    }

    /// Replace the record at `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if encoding or the write fails.
    pub async fn set(&self, key: &E::Key, record: &E) -> Result<(), RepositoryError> {
        let value = serde_json::to_value(record)?;
        self.store.set(&Self::path(key), &value).await?;
        Ok(())
    }

    /// Merge `patch` into the record at `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::DataCorruption` if `patch` is not an object,
    /// or `RepositoryError::Store` if the write fails.
    pub async fn update(&self, key: &E::Key, patch: &Value) -> Result<(), RepositoryError> {
        if !patch.is_object() {
            return Err(RepositoryError::DataCorruption(
                "update patch must be an object".to_string(),
            ));
        }
        self.store.update(&Self::path(key), patch).await?;
        Ok(())
    }

    /// Delete the record at `key`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Store` if the delete fails.
    pub async fn delete(&self, key: &E::Key) -> Result<(), RepositoryError> {
        self.store.remove(&Self::path(key)).await?;
        Ok(())
    }
}
