//! In-memory implementations of the hosted-service seams.
//!
//! Used by unit and integration tests, and by local development when no
//! backend credentials are available. Each fake keeps call counters and
//! can be switched into a failing mode to exercise error paths.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Map, Value};

use crate::blob::{BlobError, BlobStore};
use crate::db::{DocumentStore, StoreError};
use crate::identity::{IdentityError, IdentityProvider, IdentitySession};

/// Minimum password length enforced by the fake identity provider.
const MIN_PASSWORD_LENGTH: usize = 6;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

// =============================================================================
// Document store
// =============================================================================

/// In-memory JSON tree with realtime database write semantics.
#[derive(Debug, Default)]
pub struct FakeDocumentStore {
    root: Mutex<Value>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl FakeDocumentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `root` as the whole tree.
    #[must_use]
    pub fn with_root(root: Value) -> Self {
        let store = Self::new();
        *lock(&store.root) = normalize(root);
        store
    }

    /// Make every subsequent read fail (or succeed again).
    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of reads served.
    #[must_use]
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of writes applied.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Value at `path`, bypassing failure injection and counters.
    #[must_use]
    pub fn snapshot(&self, path: &str) -> Option<Value> {
        let root = lock(&self.root);
        lookup(&root, &segments(path)).cloned()
    }

    fn check_write(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Store arrays as index-keyed objects and drop nulls and empty objects,
/// the way the hosted store does.
fn normalize(value: Value) -> Value {
    let map: Map<String, Value> = match value {
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), normalize(v)))
            .filter(|(_, v)| !v.is_null())
            .collect(),
        Value::Object(map) => map
            .into_iter()
            .map(|(k, v)| (k, normalize(v)))
            .filter(|(_, v)| !v.is_null())
            .collect(),
        scalar => return scalar,
    };
    if map.is_empty() {
        Value::Null
    } else {
        Value::Object(map)
    }
}

fn lookup<'a>(node: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut current = node;
    for segment in path {
        current = current.as_object()?.get(*segment)?;
    }
    (!current.is_null()).then_some(current)
}

/// Write `value` at `path` below `node`; `Value::Null` deletes.
///
/// Empty parents left behind by a delete are pruned.
fn write_at(node: &mut Value, path: &[&str], value: Value) {
    let Some((head, rest)) = path.split_first() else {
        *node = value;
        return;
    };

    if !node.is_object() {
        if value.is_null() {
            return;
        }
        *node = Value::Object(Map::new());
    }
    let Value::Object(map) = node else {
        return;
    };

    let child = map.entry((*head).to_string()).or_insert(Value::Null);
    write_at(child, rest, value);
    if child.is_null() {
        map.remove(*head);
    }
    if map.is_empty() {
        *node = Value::Null;
    }
}

#[async_trait]
impl DocumentStore for FakeDocumentStore {
    async fn read(&self, path: &str) -> Result<Option<Value>, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable);
        }
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.snapshot(path))
    }

    async fn set(&self, path: &str, value: &Value) -> Result<(), StoreError> {
        self.check_write()?;
        let mut root = lock(&self.root);
        write_at(&mut root, &segments(path), normalize(value.clone()));
        Ok(())
    }

    async fn update(&self, path: &str, patch: &Value) -> Result<(), StoreError> {
        let Some(members) = patch.as_object() else {
            return Err(StoreError::Api {
                status: 400,
                message: "Invalid data; couldn't parse JSON object".to_string(),
            });
        };
        self.check_write()?;
        let mut root = lock(&self.root);
        let base = segments(path);
        for (child, value) in members {
            // Member names may themselves be multi-segment paths.
            let mut target = base.clone();
            target.extend(segments(child));
            write_at(&mut root, &target, normalize(value.clone()));
        }
        Ok(())
    }

    async fn remove(&self, path: &str) -> Result<(), StoreError> {
        self.check_write()?;
        let mut root = lock(&self.root);
        write_at(&mut root, &segments(path), Value::Null);
        Ok(())
    }
}

// =============================================================================
// Blob store
// =============================================================================

/// Stored object in the fake blob store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-memory blob store issuing download URLs in the hosted format.
#[derive(Debug, Default)]
pub struct FakeBlobStore {
    objects: Mutex<BTreeMap<String, FakeBlob>>,
    fail_uploads: AtomicBool,
    fail_deletes: AtomicBool,
    deletes: AtomicUsize,
}

impl FakeBlobStore {
    /// Base of the download URLs issued by the fake.
    pub const URL_BASE: &'static str = "https://blobs.test/v0/b/fake-bucket/o";

    /// Create an empty blob store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed an object, returning its download URL.
    pub fn insert(&self, path: &str, bytes: &[u8]) -> String {
        lock(&self.objects).insert(
            path.to_string(),
            FakeBlob {
                bytes: bytes.to_vec(),
                content_type: "application/octet-stream".to_string(),
            },
        );
        Self::download_url(path)
    }

    /// Download URL the fake issues for `path`.
    #[must_use]
    pub fn download_url(path: &str) -> String {
        format!(
            "{}/{}?alt=media&token=fake-token",
            Self::URL_BASE,
            urlencoding::encode(path)
        )
    }

    /// Make uploads fail (or succeed again).
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    /// Make deletes fail (or succeed again).
    pub fn fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }

    /// Whether an object exists at `path`.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        lock(&self.objects).contains_key(path)
    }

    /// Stored object at `path`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<FakeBlob> {
        lock(&self.objects).get(path).cloned()
    }

    /// Paths of all stored objects.
    #[must_use]
    pub fn paths(&self) -> Vec<String> {
        lock(&self.objects).keys().cloned().collect()
    }

    /// Number of successful deletes.
    #[must_use]
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FakeBlobStore {
    async fn upload(
        &self,
        path: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, BlobError> {
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable);
        }
        lock(&self.objects).insert(
            path.to_string(),
            FakeBlob {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(Self::download_url(path))
    }

    async fn delete(&self, path: &str) -> Result<(), BlobError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(BlobError::Unavailable);
        }
        lock(&self.objects).remove(path);
        self.deletes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

// =============================================================================
// Identity provider
// =============================================================================

#[derive(Debug, Clone)]
struct FakeAccount {
    uid: String,
    email: String,
    password: String,
}

/// In-memory identity provider with email/password accounts.
#[derive(Debug, Default)]
pub struct FakeIdentityProvider {
    accounts: Mutex<HashMap<String, FakeAccount>>,
    sign_ins: AtomicUsize,
    password_updates: AtomicUsize,
    fail_updates: AtomicBool,
}

impl FakeIdentityProvider {
    /// Create a provider with no accounts.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an account, returning its uid.
    pub fn add_account(&self, email: &str, password: &str) -> String {
        let mut accounts = lock(&self.accounts);
        let uid = format!("uid-{}", accounts.len() + 1);
        accounts.insert(
            email.trim().to_lowercase(),
            FakeAccount {
                uid: uid.clone(),
                email: email.trim().to_string(),
                password: password.to_string(),
            },
        );
        uid
    }

    /// Current password of an account.
    #[must_use]
    pub fn password_of(&self, email: &str) -> Option<String> {
        lock(&self.accounts)
            .get(&email.trim().to_lowercase())
            .map(|a| a.password.clone())
    }

    /// Make password updates fail (or succeed again).
    pub fn fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of sign-in attempts.
    #[must_use]
    pub fn sign_ins(&self) -> usize {
        self.sign_ins.load(Ordering::SeqCst)
    }

    /// Number of password update calls.
    #[must_use]
    pub fn password_updates(&self) -> usize {
        self.password_updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<IdentitySession, IdentityError> {
        self.sign_ins.fetch_add(1, Ordering::SeqCst);
        let accounts = lock(&self.accounts);
        let account = accounts
            .get(&email.trim().to_lowercase())
            .filter(|a| a.password == password.expose_secret())
            .ok_or(IdentityError::InvalidCredentials)?;

        Ok(IdentitySession {
            uid: account.uid.clone(),
            email: account.email.clone(),
            id_token: SecretString::from(format!("fake-id-token-{}", account.uid)),
        })
    }

    async fn update_password(
        &self,
        session: &IdentitySession,
        new_password: &SecretString,
    ) -> Result<(), IdentityError> {
        self.password_updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(IdentityError::Api {
                status: 503,
                message: "UNAVAILABLE".to_string(),
            });
        }
        if new_password.expose_secret().len() < MIN_PASSWORD_LENGTH {
            return Err(IdentityError::WeakPassword(
                "Password should be at least 6 characters".to_string(),
            ));
        }

        let mut accounts = lock(&self.accounts);
        let account = accounts
            .values_mut()
            .find(|a| a.uid == session.uid)
            .ok_or(IdentityError::SessionExpired)?;
        account.password = new_password.expose_secret().to_string();
        Ok(())
    }
}

// =============================================================================
// Bundle
// =============================================================================

/// The three fakes, shared so tests can inspect them after handing them
/// to the application.
#[derive(Debug, Clone, Default)]
pub struct FakeBackends {
    pub store: Arc<FakeDocumentStore>,
    pub blobs: Arc<FakeBlobStore>,
    pub identity: Arc<FakeIdentityProvider>,
}

impl FakeBackends {
    /// Create empty fakes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create fakes with the document store seeded from `root`.
    #[must_use]
    pub fn with_root(root: Value) -> Self {
        Self {
            store: Arc::new(FakeDocumentStore::with_root(root)),
            ..Self::default()
        }
    }
}
