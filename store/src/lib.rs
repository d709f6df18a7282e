mod config;
mod disk;
mod error;
mod memory;

pub use config::{StoreBackend, StoreConfig};
pub use disk::DiskStore;
pub use error::StoreError;
pub use memory::MemoryStore;

use async_trait::async_trait;
use common::models::{NewWebhook, RateSnapshot, RateTable, RecordId, WebhookRegistration};
use std::sync::Arc;
use tracing::info;

/// Persists rate snapshots in insertion order.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    /// Store `table` as a new snapshot and return it with its assigned id.
    async fn insert_snapshot(&self, table: RateTable) -> Result<RateSnapshot, StoreError>;

    /// The most recently inserted snapshot, if any.
    async fn latest_snapshot(&self) -> Result<Option<RateSnapshot>, StoreError>;

    /// Up to `limit` snapshots, newest first.
    async fn recent_snapshots(&self, limit: usize) -> Result<Vec<RateSnapshot>, StoreError>;
}

/// Persists webhook registrations.
#[async_trait]
pub trait WebhookRegistry: Send + Sync {
    async fn insert_webhook(&self, webhook: NewWebhook) -> Result<WebhookRegistration, StoreError>;

    async fn get_webhook(&self, id: &RecordId) -> Result<Option<WebhookRegistration>, StoreError>;

    async fn list_webhooks(&self) -> Result<Vec<WebhookRegistration>, StoreError>;

    /// Remove a registration. Returns false if it did not exist.
    async fn delete_webhook(&self, id: &RecordId) -> Result<bool, StoreError>;
}

/// Handles to both stores, backed by the same engine.
#[derive(Clone)]
pub struct Stores {
    pub snapshots: Arc<dyn SnapshotStore>,
    pub webhooks: Arc<dyn WebhookRegistry>,
}

impl Stores {
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            snapshots: store.clone(),
            webhooks: store,
        }
    }
}

/// Open the backend selected by `config`.
pub fn open(config: &StoreConfig) -> Result<Stores, StoreError> {
    match &config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory store; data will not survive a restart");
            Ok(Stores::memory())
        }
        StoreBackend::Disk(path) => {
            info!("Opening disk store at {}", path.display());
            let store = Arc::new(DiskStore::open(path)?);
            Ok(Stores {
                snapshots: store.clone(),
                webhooks: store,
            })
        }
    }
}
