//! Application state shared across handlers.

use std::sync::Arc;

use crate::blob::{BlobError, BlobStore};
use crate::collection::CollectionMirror;
use crate::config::{AdminConfig, FirebaseConfig};
use crate::db::{DocumentStore, Entity, Repository, StoreError};
use crate::firebase::{CloudStorage, IdentityToolkit, RealtimeDatabase};
use crate::identity::{IdentityError, IdentityProvider};
use crate::models::{Banner, Booking, Company, Message, User};

/// Error creating the hosted-service clients.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("document store client: {0}")]
    Store(#[from] StoreError),
    #[error("blob store client: {0}")]
    Blob(#[from] BlobError),
    #[error("identity client: {0}")]
    Identity(#[from] IdentityError),
}

/// The three hosted services the admin talks to.
#[derive(Clone)]
pub struct Backends {
    pub store: Arc<dyn DocumentStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub identity: Arc<dyn IdentityProvider>,
}

impl Backends {
    /// Connect to the hosted backend described by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn firebase(config: &FirebaseConfig) -> Result<Self, BackendError> {
        Ok(Self {
            store: Arc::new(RealtimeDatabase::new(config)?),
            blobs: Arc::new(CloudStorage::new(config)?),
            identity: Arc::new(IdentityToolkit::new(config)?),
        })
    }
}

impl From<crate::fake::FakeBackends> for Backends {
    fn from(fakes: crate::fake::FakeBackends) -> Self {
        Self {
            store: fakes.store,
            blobs: fakes.blobs,
            identity: fakes.identity,
        }
    }
}

/// Collection mirrors, one per browsable collection.
pub struct Mirrors {
    pub users: CollectionMirror<User>,
    pub companies: CollectionMirror<Company>,
    pub bookings: CollectionMirror<Booking>,
    pub messages: CollectionMirror<Message>,
    pub banners: CollectionMirror<Banner>,
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    backends: Backends,
    mirrors: Mirrors,
}

impl AppState {
    /// Create a new application state.
    #[must_use]
    pub fn new(config: AdminConfig, backends: Backends) -> Self {
        let ttl = config.mirror_ttl;
        let mirrors = Mirrors {
            users: CollectionMirror::new(ttl),
            companies: CollectionMirror::new(ttl),
            bookings: CollectionMirror::new(ttl),
            messages: CollectionMirror::new(ttl),
            banners: CollectionMirror::new(ttl),
        };

        Self {
            inner: Arc::new(AppStateInner {
                config,
                backends,
                mirrors,
            }),
        }
    }

    /// Get a reference to the admin configuration.
    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// Get a reference to the document store.
    #[must_use]
    pub fn store(&self) -> &dyn DocumentStore {
        self.inner.backends.store.as_ref()
    }

    /// Get a reference to the blob store.
    #[must_use]
    pub fn blobs(&self) -> &dyn BlobStore {
        self.inner.backends.blobs.as_ref()
    }

    /// Get a reference to the identity provider.
    #[must_use]
    pub fn identity(&self) -> &dyn IdentityProvider {
        self.inner.backends.identity.as_ref()
    }

    /// Get a reference to the collection mirrors.
    #[must_use]
    pub fn mirrors(&self) -> &Mirrors {
        &self.inner.mirrors
    }

    /// Repository for `E` over the document store.
    #[must_use]
    pub fn repo<E: Entity>(&self) -> Repository<'_, E> {
        Repository::new(self.store())
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}
