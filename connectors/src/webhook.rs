use crate::WebhookNotifier;
use async_trait::async_trait;
use common::{models::WebhookInvocation, trigger::Firing, Error, Result};
use tracing::{debug, error};

/// Delivers webhook payloads as JSON POST requests.
pub struct HttpWebhookNotifier {
    client: reqwest::Client,
}

impl HttpWebhookNotifier {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpWebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WebhookNotifier for HttpWebhookNotifier {
    async fn notify(&self, url: &str, payload: &WebhookInvocation) -> Result<()> {
        debug!("Invoking webhook {}", url);

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(Error::HttpError)?;

        if !response.status().is_success() {
            return Err(Error::WebhookError(format!(
                "{} responded with {}",
                url,
                response.status()
            )));
        }

        Ok(())
    }
}

/// Notify the registration behind `firing`. Failures are logged and
/// dropped; delivery is at most once.
pub async fn deliver(notifier: &dyn WebhookNotifier, firing: &Firing) {
    let payload = WebhookInvocation::new(&firing.conversion, &firing.registration);

    if let Err(e) = notifier
        .notify(&firing.registration.webhook_url, &payload)
        .await
    {
        error!(
            "Error invoking webhook {} at {}: {}",
            firing.registration.id, firing.registration.webhook_url, e
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::models::{ConversionResult, NewWebhook, RecordId, WebhookRegistration};
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn firing(url: String) -> Firing {
        Firing {
            registration: WebhookRegistration::new(
                RecordId::generate(),
                NewWebhook {
                    webhook_url: url,
                    base_currency: "NOK".to_string(),
                    target_currency: "SEK".to_string(),
                    min_trigger_value: 1.2,
                    max_trigger_value: 1.5,
                },
            ),
            conversion: ConversionResult {
                from: "NOK".to_string(),
                from_value: 1.0,
                to: "SEK".to_string(),
                to_value: 1.8,
                rate: 1.8,
            },
        }
    }

    #[tokio::test]
    async fn test_posts_invocation_payload() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .and(body_json(serde_json::json!({
                "baseCurrency": "NOK",
                "targetCurrency": "SEK",
                "currentRate": 1.8,
                "minTriggerValue": 1.2,
                "maxTriggerValue": 1.5
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier = HttpWebhookNotifier::new();
        let firing = firing(format!("{}/hook", mock_server.uri()));
        let payload = WebhookInvocation::new(&firing.conversion, &firing.registration);

        notifier
            .notify(&firing.registration.webhook_url, &payload)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let notifier = HttpWebhookNotifier::new();
        let firing = firing(format!("{}/hook", mock_server.uri()));
        let payload = WebhookInvocation::new(&firing.conversion, &firing.registration);

        let result = notifier.notify(&firing.registration.webhook_url, &payload).await;
        assert!(matches!(result, Err(Error::WebhookError(_))));
    }

    #[tokio::test]
    async fn test_deliver_swallows_failures() {
        let notifier = HttpWebhookNotifier::new();

        // Neither a bad URL nor a refused connection may panic or propagate.
        deliver(&notifier, &firing("HelloWorld".to_string())).await;
        deliver(&notifier, &firing("http://127.0.0.1:1/hook".to_string())).await;
    }

    #[tokio::test]
    async fn test_deliver_reaches_endpoint() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let notifier = HttpWebhookNotifier::new();
        deliver(&notifier, &firing(format!("{}/hook", mock_server.uri()))).await;
    }
}
