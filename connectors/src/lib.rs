pub mod fixer;
pub mod webhook;

use async_trait::async_trait;
use common::{
    models::{RateTable, WebhookInvocation},
    Result,
};

/// Trait defining the interface for upstream exchange-rate sources
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Fetch the provider's current rate table
    async fn latest_rates(&self) -> Result<RateTable>;
}

/// Trait defining how webhook notifications are delivered
#[async_trait]
pub trait WebhookNotifier: Send + Sync {
    /// Deliver `payload` to `url`. Errors are reported, never retried.
    async fn notify(&self, url: &str, payload: &WebhookInvocation) -> Result<()>;
}
