use std::{error::Error, fmt, sync::Arc};

use inmo_store::schema::DEFAULT_SUMMARY_COLLECTION;
use tokio::sync::OwnedMutexGuard;

use crate::locks::WriteLocks;
use crate::registry::{CollectionRegistry, RegistryError};
use crate::store::{RecordStore, StoreError};

pub mod summary;
pub mod upsert;

pub use summary::{SummaryReport, SummaryRequest};
pub use upsert::{UpsertOutcome, UpsertRequest};

#[derive(Debug)]
pub enum ControlError {
    UnknownCollection(String),
    InvalidInput(String),
    Store(StoreError),
}

impl fmt::Display for ControlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownCollection(name) => write!(f, "unknown collection: {name}"),
            Self::InvalidInput(message) => write!(f, "invalid input: {message}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ControlError {}

impl From<StoreError> for ControlError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl From<RegistryError> for ControlError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownCollection(name) => Self::UnknownCollection(name),
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

/// Immutable settings shared by every session.
#[derive(Debug, Clone)]
pub struct HubSettings {
    pub registry: CollectionRegistry,
    pub hub_id: String,
    pub default_collection: String,
    pub serialize_writes: bool,
}

impl HubSettings {
    pub fn new(registry: CollectionRegistry, hub_id: impl Into<String>) -> Self {
        Self {
            registry,
            hub_id: hub_id.into(),
            default_collection: DEFAULT_SUMMARY_COLLECTION.to_string(),
            serialize_writes: false,
        }
    }

    #[must_use]
    pub fn with_default_collection(mut self, default_collection: impl Into<String>) -> Self {
        self.default_collection = default_collection.into();
        self
    }

    #[must_use]
    pub const fn with_serialize_writes(mut self, serialize_writes: bool) -> Self {
        self.serialize_writes = serialize_writes;
        self
    }
}

/// Entry point for the hub operations. Cheap to clone; one per session.
pub struct HubControlPlane<S: RecordStore> {
    store: S,
    settings: Arc<HubSettings>,
    locks: Option<WriteLocks>,
}

impl<S: RecordStore> Clone for HubControlPlane<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            settings: self.settings.clone(),
            locks: self.locks.clone(),
        }
    }
}

impl<S: RecordStore> HubControlPlane<S> {
    pub fn new(store: S, settings: HubSettings) -> Self {
        Self::with_settings(store, Arc::new(settings))
    }

    pub fn with_settings(store: S, settings: Arc<HubSettings>) -> Self {
        let locks = settings.serialize_writes.then(WriteLocks::new);
        Self {
            store,
            settings,
            locks,
        }
    }

    pub const fn store(&self) -> &S {
        &self.store
    }

    pub fn settings(&self) -> &HubSettings {
        &self.settings
    }

    /// Configured logical collection names, sorted.
    pub fn collection_names(&self) -> Vec<String> {
        self.settings.registry.names().map(str::to_string).collect()
    }

    fn resolve(&self, name: &str) -> Result<String, ControlError> {
        Ok(self.settings.registry.resolve(name)?.to_string())
    }

    /// Holds the single-writer lock for `key` when that mode is enabled.
    async fn serialize(&self, key: &str) -> Option<OwnedMutexGuard<()>> {
        match self.locks.as_ref() {
            Some(locks) => Some(locks.acquire(key).await),
            None => None,
        }
    }
}
