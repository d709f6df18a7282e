use crate::service::RateService;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

/// Periodic rate ingestion. Runs once immediately, then every `period`.
pub struct IngestionJob {
    service: Arc<RateService>,
    period: Duration,
}

impl IngestionJob {
    pub fn new(service: Arc<RateService>, period: Duration) -> Self {
        Self { service, period }
    }

    /// Run a single cycle, logging instead of propagating failures.
    pub async fn tick(&self) {
        match self.service.ingest().await {
            Ok(_delivery) => {}
            Err(e) => error!("Rate ingestion failed, skipping until next tick: {}", e),
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        info!("Starting rate ingestion every {:?}", self.period);

        tokio::spawn(async move {
            let mut interval = time::interval(self.period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                interval.tick().await;
                self.tick().await;
            }
        })
    }
}
