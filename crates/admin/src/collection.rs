//! In-memory mirrors of hosted collections.
//!
//! Each admin resource follows the same cycle: load the whole collection
//! (served from a short-lived mirror on later requests), filter it per
//! request, write a single record, then re-read that record and patch the
//! mirror with the authoritative value.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tokio::sync::Mutex;

use crate::db::{Entity, Records, Repository, RepositoryError};
use crate::models::Keyed;

/// Short-lived mirror of one collection.
///
/// The collection is cached as a single immutable snapshot; record-level
/// changes replace the snapshot with a patched copy. Every change to the
/// snapshot happens under `writes`, which also counts changes so a load
/// that raced a change does not overwrite it.
#[derive(Clone)]
pub struct CollectionMirror<E: Entity> {
    cache: Cache<(), Arc<Records<E>>>,
    writes: Arc<Mutex<u64>>,
}

impl<E: Entity> CollectionMirror<E> {
    /// Create an empty mirror whose snapshot expires after `ttl`.
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
            writes: Arc::new(Mutex::new(0)),
        }
    }

    /// The mirrored collection, loading it from the store when absent or
    /// when `refresh` is set.
    ///
    /// A failed load leaves nothing cached. A load that overlapped a
    /// record change returns what it read without caching it.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the collection cannot be read.
    pub async fn load(
        &self,
        repo: &Repository<'_, E>,
        refresh: bool,
    ) -> Result<Arc<Records<E>>, RepositoryError> {
        if !refresh && let Some(records) = self.cache.get(&()).await {
            return Ok(records);
        }

        let started = *self.writes.lock().await;
        let records = Arc::new(repo.list().await?);

        let writes = self.writes.lock().await;
        if *writes == started {
            self.cache.insert((), Arc::clone(&records)).await;
        } else {
            tracing::debug!(
                collection = E::COLLECTION,
                "Collection changed during load, not caching"
            );
        }
        drop(writes);
        Ok(records)
    }

    /// Cached snapshot, if one is loaded.
    pub async fn cached(&self) -> Option<Arc<Records<E>>> {
        self.cache.get(&()).await
    }

    /// Replace one record in the cached snapshot.
    ///
    /// Does nothing to the cache when no snapshot is loaded; the next load
    /// reads the store anyway.
    pub async fn upsert(&self, key: E::Key, record: E) {
        let mut writes = self.writes.lock().await;
        *writes += 1;
        if let Some(current) = self.cache.get(&()).await {
            let mut records = Records::<E>::clone(&current);
            records.insert(key, record);
            self.cache.insert((), Arc::new(records)).await;
        }
        drop(writes);
    }

    /// Remove one record from the cached snapshot.
    pub async fn remove(&self, key: &E::Key) {
        let mut writes = self.writes.lock().await;
        *writes += 1;
        if let Some(current) = self.cache.get(&()).await
            && current.contains_key(key)
        {
            let mut records = Records::<E>::clone(&current);
            records.remove(key);
            self.cache.insert((), Arc::new(records)).await;
        }
        drop(writes);
    }

    /// Drop the cached snapshot.
    pub async fn invalidate(&self) {
        let mut writes = self.writes.lock().await;
        *writes += 1;
        self.cache.invalidate(&()).await;
        drop(writes);
    }

    /// Re-read a record after writing it and patch the mirror.
    ///
    /// `local` is the value the caller expects the store to hold now.
    /// If the record is gone it is removed from the mirror. If the re-read
    /// fails the whole mirror is invalidated and `local` is returned.
    #[tracing::instrument(skip(self, repo, local), fields(collection = E::COLLECTION, key = %key))]
    pub async fn sync_record(
        &self,
        repo: &Repository<'_, E>,
        key: &E::Key,
        local: Option<E>,
    ) -> Option<E> {
        match repo.get(key).await {
            Ok(Some(record)) => {
                self.upsert(key.clone(), record.clone()).await;
                Some(record)
            }
            Ok(None) => {
                self.remove(key).await;
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Re-read after write failed, invalidating mirror");
                self.invalidate().await;
                local
            }
        }
    }
}

impl<E: Entity> std::fmt::Debug for CollectionMirror<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CollectionMirror")
            .field("collection", &E::COLLECTION)
            .field("entries", &self.cache.entry_count())
            .finish()
    }
}

/// Free-text filter over an entity's search fields.
///
/// Matching is case-insensitive substring containment of the query as
/// given, surrounding whitespace included. A blank query matches
/// everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionFilter {
    needle: Option<String>,
}

impl CollectionFilter {
    /// Build a filter from an optional raw query.
    #[must_use]
    pub fn new(query: Option<&str>) -> Self {
        let needle = query
            .filter(|q| !q.trim().is_empty())
            .map(str::to_lowercase);
        Self { needle }
    }

    /// Whether the filter passes everything.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.needle.is_none()
    }

    /// Whether `record` matches the query.
    #[must_use]
    pub fn matches<E: Entity>(&self, key: &E::Key, record: &E) -> bool {
        let Some(needle) = &self.needle else {
            return true;
        };
        record
            .search_fields(key)
            .into_iter()
            .any(|field| field.to_lowercase().contains(needle.as_str()))
    }

    /// Matching records in key order, paired with their keys.
    #[must_use]
    pub fn apply<E: Entity>(&self, records: &Records<E>) -> Vec<Keyed<E::Key, E>> {
        self.apply_where(records, |_| true)
    }

    /// Like [`apply`](Self::apply), keeping only records that also pass
    /// `predicate`, which is checked first.
    #[must_use]
    pub fn apply_where<E: Entity>(
        &self,
        records: &Records<E>,
        predicate: impl Fn(&E) -> bool,
    ) -> Vec<Keyed<E::Key, E>> {
        records
            .iter()
            .filter(|(_, record)| predicate(record))
            .filter(|(key, record)| self.matches(*key, *record))
            .map(|(key, record)| Keyed::new(key.clone(), record.clone()))
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::DocumentStore;
    use crate::fake::FakeDocumentStore;
    use crate::models::{Booking, StatusFilter, User};
    use serde_json::json;
    use taskmaster_core::{BookingKey, RecordKey, UserKey};

    fn store() -> FakeDocumentStore {
        FakeDocumentStore::with_root(json!({
            "users": {
                "u1": {"email": "ana@example.com", "name": "Ana Silva", "userType": "customer"},
                "u2": {"email": "bo@example.com", "name": "Bo", "userType": "serviceProvider"}
            },
            "bookings": {
                "a": {"serviceName": "Plumbing", "userName": "Ana", "status": "pending"},
                "b": {"serviceName": "Cleaning", "userName": "Bo", "status": "completed"},
                "c": {"serviceName": "Cleaning", "userName": "Cy"}
            }
        }))
    }

    fn mirror<E: Entity>() -> CollectionMirror<E> {
        CollectionMirror::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn test_load_is_served_from_mirror() {
        let store = store();
        let repo = Repository::<User>::new(&store);
        let users = mirror::<User>();

        assert_eq!(users.load(&repo, false).await.unwrap().len(), 2);
        assert_eq!(users.load(&repo, false).await.unwrap().len(), 2);
        assert_eq!(store.reads(), 1);

        users.load(&repo, true).await.unwrap();
        assert_eq!(store.reads(), 2);
    }

    #[tokio::test]
    async fn test_failed_load_caches_nothing() {
        let store = store();
        let repo = Repository::<User>::new(&store);
        let users = mirror::<User>();

        store.fail_reads(true);
        assert!(users.load(&repo, false).await.is_err());
        assert!(users.cached().await.is_none());

        store.fail_reads(false);
        assert_eq!(users.load(&repo, false).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_absent_collection_is_empty() {
        let store = FakeDocumentStore::new();
        let repo = Repository::<User>::new(&store);
        assert!(mirror::<User>().load(&repo, false).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sync_record_patches_mirror() {
        let store = store();
        let repo = Repository::<Booking>::new(&store);
        let bookings = mirror::<Booking>();
        bookings.load(&repo, false).await.unwrap();

        let key = BookingKey::parse("a").unwrap();
        repo.update(&key, &json!({"status": "completed"})).await.unwrap();
        let synced = bookings.sync_record(&repo, &key, None).await.unwrap();
        assert_eq!(synced.status.as_deref(), Some("completed"));

        let cached = bookings.cached().await.unwrap();
        let a = cached.get(&key).unwrap();
        assert_eq!(a.status.as_deref(), Some("completed"));
        assert_eq!(a.service_name, "Plumbing");
    }

    #[tokio::test]
    async fn test_sync_record_removes_vanished_record() {
        let store = store();
        let repo = Repository::<Booking>::new(&store);
        let bookings = mirror::<Booking>();
        bookings.load(&repo, false).await.unwrap();

        let key = BookingKey::parse("b").unwrap();
        store.remove("bookings/b").await.unwrap();
        assert!(bookings.sync_record(&repo, &key, None).await.is_none());
        assert!(!bookings.cached().await.unwrap().contains_key(&key));
    }

    #[tokio::test]
    async fn test_sync_record_failure_invalidates_and_returns_local() {
        let store = store();
        let repo = Repository::<Booking>::new(&store);
        let bookings = mirror::<Booking>();
        bookings.load(&repo, false).await.unwrap();

        let key = BookingKey::parse("c").unwrap();
        let local = Booking {
            status: Some("absent".to_string()),
            ..Booking::default()
        };
        store.fail_reads(true);
        let out = bookings.sync_record(&repo, &key, Some(local.clone())).await;
        assert_eq!(out, Some(local));
        assert!(bookings.cached().await.is_none());
    }

    #[tokio::test]
    async fn test_filter_is_case_insensitive_substring() {
        let store = store();
        let repo = Repository::<User>::new(&store);
        let users = mirror::<User>().load(&repo, false).await.unwrap();

        let hits = CollectionFilter::new(Some("SILVA")).apply(&users);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits.first().map(|k| k.key.clone()), Some(UserKey::parse("u1").unwrap()));

        let providers = CollectionFilter::new(Some("serviceprovider")).apply(&users);
        assert_eq!(providers.len(), 1);
    }

    #[tokio::test]
    async fn test_filter_keeps_surrounding_whitespace() {
        let store = store();
        let repo = Repository::<User>::new(&store);
        let users = mirror::<User>().load(&repo, false).await.unwrap();

        assert_eq!(CollectionFilter::new(Some(" silva")).apply(&users).len(), 1);
        assert!(CollectionFilter::new(Some(" silva ")).apply(&users).is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_upserts_all_land_in_mirror() {
        let store = store();
        let repo = Repository::<User>::new(&store);
        let users = mirror::<User>();
        users.load(&repo, false).await.unwrap();

        let tasks: Vec<_> = (0..100)
            .map(|i| {
                let users = users.clone();
                tokio::spawn(async move {
                    let key = UserKey::parse(&format!("k{i}")).unwrap();
                    let user = User {
                        name: Some(format!("User {i}")),
                        ..User::default()
                    };
                    users.upsert(key, user).await;
                })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(users.cached().await.unwrap().len(), 102);
    }

    #[tokio::test]
    async fn test_blank_query_is_identity() {
        let store = store();
        let repo = Repository::<User>::new(&store);
        let users = mirror::<User>().load(&repo, false).await.unwrap();

        assert!(CollectionFilter::new(Some("   ")).is_empty());
        assert_eq!(CollectionFilter::new(None).apply(&users).len(), users.len());
    }

    #[tokio::test]
    async fn test_status_filter_applies_before_query() {
        let store = store();
        let repo = Repository::<Booking>::new(&store);
        let bookings = mirror::<Booking>().load(&repo, false).await.unwrap();

        let completed: StatusFilter = "completed".parse().unwrap();
        let hits = CollectionFilter::new(None).apply_where(&bookings, |b| completed.matches(b));
        let keys: Vec<&str> = hits.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(keys, vec!["b"]);

        let unset: StatusFilter = "none".parse().unwrap();
        let hits =
            CollectionFilter::new(Some("cleaning")).apply_where(&bookings, |b| unset.matches(b));
        let keys: Vec<&str> = hits.iter().map(|k| k.key.as_str()).collect();
        assert_eq!(keys, vec!["c"]);
    }
}
