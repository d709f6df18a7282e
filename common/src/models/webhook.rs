use crate::models::{ConversionResult, RecordId};
use serde::{Deserialize, Serialize};

/// Body of a webhook registration request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct NewWebhook {
    #[serde(rename = "WebhookURL")]
    pub webhook_url: String,
    pub base_currency: String,
    pub target_currency: String,
    pub min_trigger_value: f64,
    pub max_trigger_value: f64,
}

/// A stored webhook registration. `min_trigger_value <= max_trigger_value`
/// is expected but not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookRegistration {
    #[serde(rename = "id")]
    pub id: RecordId,
    #[serde(rename = "WebhookURL")]
    pub webhook_url: String,
    pub base_currency: String,
    pub target_currency: String,
    pub min_trigger_value: f64,
    pub max_trigger_value: f64,
}

impl WebhookRegistration {
    pub fn new(id: RecordId, webhook: NewWebhook) -> Self {
        Self {
            id,
            webhook_url: webhook.webhook_url,
            base_currency: webhook.base_currency,
            target_currency: webhook.target_currency,
            min_trigger_value: webhook.min_trigger_value,
            max_trigger_value: webhook.max_trigger_value,
        }
    }

    /// True when `rate` falls strictly outside the trigger band.
    pub fn is_out_of_band(&self, rate: f64) -> bool {
        rate > self.max_trigger_value || rate < self.min_trigger_value
    }
}

/// Payload POSTed to a webhook URL when it fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookInvocation {
    pub base_currency: String,
    pub target_currency: String,
    pub current_rate: f64,
    pub min_trigger_value: f64,
    pub max_trigger_value: f64,
}

impl WebhookInvocation {
    pub fn new(conversion: &ConversionResult, registration: &WebhookRegistration) -> Self {
        Self {
            base_currency: conversion.from.clone(),
            target_currency: conversion.to.clone(),
            current_rate: conversion.rate,
            min_trigger_value: registration.min_trigger_value,
            max_trigger_value: registration.max_trigger_value,
        }
    }
}

/// Currency pair named in `/latest` and `/average` requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PairQuery {
    pub base_currency: String,
    pub target_currency: String,
}
