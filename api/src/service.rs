use common::{
    models::{NewWebhook, PairQuery, RateTable, RecordId, WebhookRegistration},
    trigger::{self, Firing, TriggerMode},
    Error, Result,
};
use connectors::{webhook, RateProvider, WebhookNotifier};
use futures::future::join_all;
use std::sync::Arc;
use store::{SnapshotStore, Stores, WebhookRegistry};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Service tying the rate provider, the stores and webhook delivery together
pub struct RateService {
    /// Upstream rate source
    provider: Arc<dyn RateProvider>,
    snapshots: Arc<dyn SnapshotStore>,
    webhooks: Arc<dyn WebhookRegistry>,
    /// Webhook delivery transport
    notifier: Arc<dyn WebhookNotifier>,
    /// How many snapshots `/average` looks back over
    average_window: usize,
}

impl RateService {
    pub fn new(
        provider: Arc<dyn RateProvider>,
        stores: Stores,
        notifier: Arc<dyn WebhookNotifier>,
        average_window: usize,
    ) -> Self {
        Self {
            provider,
            snapshots: stores.snapshots,
            webhooks: stores.webhooks,
            notifier,
            average_window,
        }
    }

    /// Fetch the provider's current table without storing it
    pub async fn live_rates(&self) -> Result<RateTable> {
        self.provider.latest_rates().await
    }

    pub async fn register_webhook(&self, webhook: NewWebhook) -> Result<WebhookRegistration> {
        let registration = self.webhooks.insert_webhook(webhook).await?;
        info!(
            "Registered webhook {} for {}/{} band [{}, {}]",
            registration.id,
            registration.base_currency,
            registration.target_currency,
            registration.min_trigger_value,
            registration.max_trigger_value
        );
        Ok(registration)
    }

    pub async fn get_webhook(&self, id: &RecordId) -> Result<WebhookRegistration> {
        self.webhooks
            .get_webhook(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Webhook with ID '{}' not found", id)))
    }

    pub async fn delete_webhook(&self, id: &RecordId) -> Result<()> {
        if !self.webhooks.delete_webhook(id).await? {
            return Err(Error::NotFound(format!("Webhook with ID '{}' not found", id)));
        }
        info!("Deleted webhook {}", id);
        Ok(())
    }

    /// Rate for `pair` in the most recent snapshot
    pub async fn latest_rate(&self, pair: &PairQuery) -> Result<f64> {
        let snapshot = self
            .snapshots
            .latest_snapshot()
            .await?
            .ok_or_else(|| Error::NotFound("No rate snapshots stored yet".to_string()))?;

        debug!(
            "Converting {}/{} using snapshot {}",
            pair.base_currency, pair.target_currency, snapshot.id
        );

        let conversion = snapshot.cross_rate(&pair.base_currency, &pair.target_currency)?;
        Ok(conversion.rate)
    }

    /// Mean rate for `pair` over the most recent snapshots
    pub async fn average_rate(&self, pair: &PairQuery) -> Result<f64> {
        let snapshots = self.snapshots.recent_snapshots(self.average_window).await?;
        if snapshots.is_empty() {
            return Err(Error::NotFound("No rate snapshots stored yet".to_string()));
        }

        let mut total = 0.0;
        for snapshot in &snapshots {
            total += snapshot
                .cross_rate(&pair.base_currency, &pair.target_currency)?
                .rate;
        }

        debug!(
            "Averaged {}/{} over {} snapshots",
            pair.base_currency,
            pair.target_currency,
            snapshots.len()
        );

        Ok(total / snapshots.len() as f64)
    }

    /// Fire every registered webhook against the latest snapshot, ignoring
    /// trigger bands. Delivery continues in the background.
    pub async fn evaluate_all(&self) -> Result<JoinHandle<()>> {
        let snapshot = self
            .snapshots
            .latest_snapshot()
            .await?
            .ok_or_else(|| Error::DbError("No rate snapshots stored yet".to_string()))?;
        let registrations = self.webhooks.list_webhooks().await?;

        let firings = trigger::evaluate(&snapshot.table, &registrations, TriggerMode::Always);
        info!(
            "Evaluation requested: invoking {} of {} webhooks",
            firings.len(),
            registrations.len()
        );

        Ok(self.dispatch(firings))
    }

    /// One ingestion cycle: fetch, store, then fire out-of-band webhooks.
    pub async fn ingest(&self) -> Result<JoinHandle<()>> {
        let table = self.provider.latest_rates().await?;
        let snapshot = self.snapshots.insert_snapshot(table).await?;
        info!(
            "Stored snapshot {} dated {} with {} rates",
            snapshot.id,
            snapshot.table.date,
            snapshot.table.rates.len()
        );

        let registrations = self.webhooks.list_webhooks().await?;
        let firings = trigger::evaluate(&snapshot.table, &registrations, TriggerMode::OutOfBand);
        info!(
            "{} of {} webhooks out of band",
            firings.len(),
            registrations.len()
        );

        Ok(self.dispatch(firings))
    }

    /// Deliver `firings` on a background task. Callers may drop the handle.
    pub fn dispatch(&self, firings: Vec<Firing>) -> JoinHandle<()> {
        let notifier = self.notifier.clone();
        tokio::spawn(async move {
            join_all(
                firings
                    .iter()
                    .map(|firing| webhook::deliver(notifier.as_ref(), firing)),
            )
            .await;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use common::models::WebhookInvocation;
    use std::collections::BTreeMap;
    use tokio::sync::Mutex;

    struct StaticProvider(RateTable);

    #[async_trait]
    impl RateProvider for StaticProvider {
        async fn latest_rates(&self) -> Result<RateTable> {
            Ok(self.0.clone())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl RateProvider for FailingProvider {
        async fn latest_rates(&self) -> Result<RateTable> {
            Err(Error::ParseError("garbage".to_string()))
        }
    }

    #[derive(Default)]
    struct RecordingNotifier {
        calls: Mutex<Vec<(String, WebhookInvocation)>>,
    }

    #[async_trait]
    impl WebhookNotifier for RecordingNotifier {
        async fn notify(&self, url: &str, payload: &WebhookInvocation) -> Result<()> {
            self.calls
                .lock()
                .await
                .push((url.to_string(), payload.clone()));
            Ok(())
        }
    }

    // NOK->SEK = 1.8, NOK->DKK = 1.35
    fn table() -> RateTable {
        RateTable {
            base: "EUR".to_string(),
            date: "2017-11-03".to_string(),
            rates: BTreeMap::from([
                ("NOK".to_string(), 5.0),
                ("SEK".to_string(), 9.0),
                ("DKK".to_string(), 6.75),
            ]),
        }
    }

    fn hook(url: &str, target: &str) -> NewWebhook {
        NewWebhook {
            webhook_url: url.to_string(),
            base_currency: "NOK".to_string(),
            target_currency: target.to_string(),
            min_trigger_value: 1.2,
            max_trigger_value: 1.5,
        }
    }

    fn pair(base: &str, target: &str) -> PairQuery {
        PairQuery {
            base_currency: base.to_string(),
            target_currency: target.to_string(),
        }
    }

    fn service(provider: Arc<dyn RateProvider>) -> (RateService, Arc<RecordingNotifier>, Stores) {
        let stores = Stores::memory();
        let notifier = Arc::new(RecordingNotifier::default());
        let service = RateService::new(provider, stores.clone(), notifier.clone(), 7);
        (service, notifier, stores)
    }

    #[tokio::test]
    async fn test_ingest_fires_only_out_of_band() {
        let (service, notifier, stores) = service(Arc::new(StaticProvider(table())));
        service.register_webhook(hook("http://sek", "SEK")).await.unwrap();
        service.register_webhook(hook("http://dkk", "DKK")).await.unwrap();

        service.ingest().await.unwrap().await.unwrap();

        assert_eq!(stores.snapshots.recent_snapshots(10).await.unwrap().len(), 1);
        let calls = notifier.calls.lock().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "http://sek");
        assert!((calls[0].1.current_rate - 1.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_ingest_failure_stores_nothing() {
        let (service, notifier, stores) = service(Arc::new(FailingProvider));
        service.register_webhook(hook("http://sek", "SEK")).await.unwrap();

        assert!(matches!(service.ingest().await, Err(Error::ParseError(_))));
        assert!(stores.snapshots.latest_snapshot().await.unwrap().is_none());
        assert!(notifier.calls.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_evaluate_all_ignores_band() {
        let (service, notifier, stores) = service(Arc::new(StaticProvider(table())));
        stores.snapshots.insert_snapshot(table()).await.unwrap();
        service.register_webhook(hook("http://sek", "SEK")).await.unwrap();
        service.register_webhook(hook("http://dkk", "DKK")).await.unwrap();

        service.evaluate_all().await.unwrap().await.unwrap();

        let mut urls: Vec<_> = notifier
            .calls
            .lock()
            .await
            .iter()
            .map(|(url, _)| url.clone())
            .collect();
        urls.sort();
        assert_eq!(urls, vec!["http://dkk", "http://sek"]);
    }

    #[tokio::test]
    async fn test_evaluate_all_without_snapshot_is_store_error() {
        let (service, _, _) = service(Arc::new(StaticProvider(table())));
        assert!(matches!(service.evaluate_all().await, Err(Error::DbError(_))));
    }

    #[tokio::test]
    async fn test_average_uses_window() {
        let (service, _, stores) = service(Arc::new(StaticProvider(table())));

        // oldest snapshot falls outside the 7-snapshot window
        let mut expected = Vec::new();
        for i in 0..8 {
            let mut t = table();
            t.rates.insert("SEK".to_string(), 9.0 + i as f64);
            stores.snapshots.insert_snapshot(t).await.unwrap();
            if i > 0 {
                expected.push((9.0 + i as f64) / 5.0);
            }
        }
        let mean = expected.iter().sum::<f64>() / expected.len() as f64;

        let average = service.average_rate(&pair("NOK", "SEK")).await.unwrap();
        assert!((average - mean).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_average_of_fewer_snapshots_than_window() {
        let (service, _, stores) = service(Arc::new(StaticProvider(table())));
        stores.snapshots.insert_snapshot(table()).await.unwrap();

        let average = service.average_rate(&pair("NOK", "SEK")).await.unwrap();
        assert!((average - 1.8).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_latest_rate_errors() {
        let (service, _, stores) = service(Arc::new(StaticProvider(table())));
        assert!(matches!(
            service.latest_rate(&pair("NOK", "SEK")).await,
            Err(Error::NotFound(_))
        ));

        stores.snapshots.insert_snapshot(table()).await.unwrap();
        assert!(matches!(
            service.latest_rate(&pair("NOK", "XXX")).await,
            Err(Error::UnknownCurrency(_))
        ));
    }

    #[tokio::test]
    async fn test_average_fails_when_a_snapshot_lacks_the_pair() {
        let (service, _, stores) = service(Arc::new(StaticProvider(table())));
        stores.snapshots.insert_snapshot(table()).await.unwrap();

        let mut without_sek = table();
        without_sek.rates.remove("SEK");
        stores.snapshots.insert_snapshot(without_sek).await.unwrap();
        stores.snapshots.insert_snapshot(table()).await.unwrap();

        // a missing code is an error, not a 0.0 folded into the mean
        assert!(matches!(
            service.average_rate(&pair("NOK", "SEK")).await,
            Err(Error::UnknownCurrency(code)) if code == "SEK"
        ));
    }
}
