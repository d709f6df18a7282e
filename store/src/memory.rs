use crate::{SnapshotStore, StoreError, WebhookRegistry};
use async_trait::async_trait;
use common::models::{NewWebhook, RateSnapshot, RateTable, RecordId, WebhookRegistration};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory store. Each operation takes the lock once, which is the only
/// atomicity callers get.
#[derive(Default)]
pub struct MemoryStore {
    snapshots: RwLock<Vec<RateSnapshot>>,
    webhooks: RwLock<HashMap<RecordId, WebhookRegistration>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for MemoryStore {
    async fn insert_snapshot(&self, table: RateTable) -> Result<RateSnapshot, StoreError> {
        let snapshot = RateSnapshot::new(table);
        debug!(
            "Storing snapshot {} ({} rates, base {})",
            snapshot.id,
            snapshot.table.rates.len(),
            snapshot.table.base
        );
        self.snapshots.write().await.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn latest_snapshot(&self) -> Result<Option<RateSnapshot>, StoreError> {
        Ok(self.snapshots.read().await.last().cloned())
    }

    async fn recent_snapshots(&self, limit: usize) -> Result<Vec<RateSnapshot>, StoreError> {
        let snapshots = self.snapshots.read().await;
        Ok(snapshots.iter().rev().take(limit).cloned().collect())
    }
}

#[async_trait]
impl WebhookRegistry for MemoryStore {
    async fn insert_webhook(&self, webhook: NewWebhook) -> Result<WebhookRegistration, StoreError> {
        let registration = WebhookRegistration::new(RecordId::generate(), webhook);
        debug!("Storing webhook {}", registration.id);
        self.webhooks
            .write()
            .await
            .insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn get_webhook(&self, id: &RecordId) -> Result<Option<WebhookRegistration>, StoreError> {
        Ok(self.webhooks.read().await.get(id).cloned())
    }

    async fn list_webhooks(&self) -> Result<Vec<WebhookRegistration>, StoreError> {
        let mut webhooks: Vec<_> = self.webhooks.read().await.values().cloned().collect();
        webhooks.sort_by_key(|w| w.id);
        Ok(webhooks)
    }

    async fn delete_webhook(&self, id: &RecordId) -> Result<bool, StoreError> {
        Ok(self.webhooks.write().await.remove(id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn table(date: &str, nok: f64) -> RateTable {
        RateTable {
            base: "EUR".to_string(),
            date: date.to_string(),
            rates: BTreeMap::from([("NOK".to_string(), nok)]),
        }
    }

    fn webhook(url: &str) -> NewWebhook {
        NewWebhook {
            webhook_url: url.to_string(),
            base_currency: "NOK".to_string(),
            target_currency: "SEK".to_string(),
            min_trigger_value: 1.2,
            max_trigger_value: 1.5,
        }
    }

    #[tokio::test]
    async fn test_empty_store() {
        let store = MemoryStore::new();
        assert!(store.latest_snapshot().await.unwrap().is_none());
        assert!(store.recent_snapshots(7).await.unwrap().is_empty());
        assert!(store.list_webhooks().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_latest_and_recent_follow_insertion_order() {
        let store = MemoryStore::new();
        for day in 1..=9 {
            store
                .insert_snapshot(table(&format!("2017-11-{:02}", day), day as f64))
                .await
                .unwrap();
        }

        let latest = store.latest_snapshot().await.unwrap().unwrap();
        assert_eq!(latest.table.date, "2017-11-09");

        let recent = store.recent_snapshots(7).await.unwrap();
        let dates: Vec<_> = recent.iter().map(|s| s.table.date.as_str()).collect();
        assert_eq!(
            dates,
            vec![
                "2017-11-09", "2017-11-08", "2017-11-07", "2017-11-06", "2017-11-05",
                "2017-11-04", "2017-11-03"
            ]
        );
    }

    #[tokio::test]
    async fn test_webhook_lifecycle() {
        let store = MemoryStore::new();
        let created = store.insert_webhook(webhook("http://a")).await.unwrap();

        let fetched = store.get_webhook(&created.id).await.unwrap();
        assert_eq!(fetched, Some(created.clone()));
        assert_eq!(store.list_webhooks().await.unwrap(), vec![created.clone()]);

        assert!(store.delete_webhook(&created.id).await.unwrap());
        assert!(!store.delete_webhook(&created.id).await.unwrap());
        assert!(store.get_webhook(&created.id).await.unwrap().is_none());
    }
}
