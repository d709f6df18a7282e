use crate::RateProvider;
use async_trait::async_trait;
use common::{models::RateTable, Error, Result};
use tracing::{debug, error};

pub const FIXER_API_URL: &str = "https://api.fixer.io";

/// Connector for fixer-style `/latest` endpoints returning
/// `{base, date, rates}`.
pub struct FixerConnector {
    client: reqwest::Client,
    base_url: String,
    access_key: Option<String>,
    anchor: String,
}

impl FixerConnector {
    pub fn new(base_url: &str, access_key: Option<String>, anchor: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            access_key,
            anchor: anchor.to_string(),
        }
    }
}

#[async_trait]
impl RateProvider for FixerConnector {
    async fn latest_rates(&self) -> Result<RateTable> {
        let url = format!("{}/latest", self.base_url);

        debug!("Fetching latest rates from {}", url);

        let mut request = self.client.get(&url);
        if let Some(key) = &self.access_key {
            request = request.query(&[("access_key", key)]);
        }

        let response = request.send().await.map_err(Error::HttpError)?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!("Rate provider error: {} - {}", status, error_text);
            return Err(Error::ProviderError(format!(
                "Rate provider error: {} - {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(Error::HttpError)?;
        let table: RateTable = serde_json::from_str(&body).map_err(|e| {
            Error::ParseError(format!("Failed to parse rate provider response: {}", e))
        })?;

        Ok(table.normalize(&self.anchor))
    }
}
