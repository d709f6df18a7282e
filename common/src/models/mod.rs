mod id;
mod rates;
mod webhook;

pub use id::RecordId;
pub use rates::{ConversionResult, RateSnapshot, RateTable};
pub use webhook::{NewWebhook, PairQuery, WebhookInvocation, WebhookRegistration};
