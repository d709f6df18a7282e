use crate::{SnapshotStore, StoreError, WebhookRegistry};
use async_trait::async_trait;
use common::models::{NewWebhook, RateSnapshot, RateTable, RecordId, WebhookRegistration};
use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::sync::Mutex;
use tracing::debug;

const SNAPSHOTS: &str = "snapshots";
const WEBHOOKS: &str = "webhooks";

/// Store backed by a fjall keyspace.
///
/// Records are JSON values keyed by their id bytes. Ids sort by creation
/// time, so key order in the snapshot partition is insertion order.
pub struct DiskStore {
    keyspace: Keyspace,
    snapshots: PartitionHandle,
    webhooks: PartitionHandle,
    /// Serializes check-then-remove on `webhooks`
    webhook_delete: Mutex<()>,
}

impl DiskStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        std::fs::create_dir_all(path)?;

        let keyspace = Config::new(path).open()?;
        let snapshots = keyspace.open_partition(SNAPSHOTS, PartitionCreateOptions::default())?;
        let webhooks = keyspace.open_partition(WEBHOOKS, PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            snapshots,
            webhooks,
            webhook_delete: Mutex::new(()),
        })
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.keyspace.persist(PersistMode::SyncAll)?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(value: &[u8]) -> Result<T, StoreError> {
    Ok(serde_json::from_slice(value)?)
}

#[async_trait]
impl SnapshotStore for DiskStore {
    async fn insert_snapshot(&self, table: RateTable) -> Result<RateSnapshot, StoreError> {
        let snapshot = RateSnapshot::new(table);
        debug!(
            "Writing snapshot {} ({} rates, base {})",
            snapshot.id,
            snapshot.table.rates.len(),
            snapshot.table.base
        );

        self.snapshots
            .insert(snapshot.id.as_bytes(), serde_json::to_vec(&snapshot)?)?;
        self.persist()?;
        Ok(snapshot)
    }

    async fn latest_snapshot(&self) -> Result<Option<RateSnapshot>, StoreError> {
        match self.snapshots.last_key_value()? {
            Some((_, value)) => Ok(Some(decode(&value)?)),
            None => Ok(None),
        }
    }

    async fn recent_snapshots(&self, limit: usize) -> Result<Vec<RateSnapshot>, StoreError> {
        let mut snapshots = Vec::with_capacity(limit);
        for item in self.snapshots.iter().rev().take(limit) {
            let (_, value) = item?;
            snapshots.push(decode(&value)?);
        }
        Ok(snapshots)
    }
}

#[async_trait]
impl WebhookRegistry for DiskStore {
    async fn insert_webhook(&self, webhook: NewWebhook) -> Result<WebhookRegistration, StoreError> {
        let registration = WebhookRegistration::new(RecordId::generate(), webhook);
        debug!("Writing webhook {}", registration.id);

        self.webhooks
            .insert(registration.id.as_bytes(), serde_json::to_vec(&registration)?)?;
        self.persist()?;
        Ok(registration)
    }

    async fn get_webhook(&self, id: &RecordId) -> Result<Option<WebhookRegistration>, StoreError> {
        match self.webhooks.get(id.as_bytes())? {
            Some(value) => Ok(Some(decode(&value)?)),
            None => Ok(None),
        }
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookRegistration>, StoreError> {
        let mut webhooks = Vec::new();
        for item in self.webhooks.iter() {
            let (_, value) = item?;
            webhooks.push(decode(&value)?);
        }
        Ok(webhooks)
    }

    async fn delete_webhook(&self, id: &RecordId) -> Result<bool, StoreError> {
        let _guard = self.webhook_delete.lock().await;
        if !self.webhooks.contains_key(id.as_bytes())? {
            return Ok(false);
        }
        self.webhooks.remove(id.as_bytes())?;
        self.persist()?;
        debug!("Deleted webhook {}", id);
        Ok(true)
    }
}
