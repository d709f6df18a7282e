use common::DEFAULT_ANCHOR_CURRENCY;
use connectors::fixer::FIXER_API_URL;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DAY_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    /// Root of the upstream rate provider; `/latest` is appended
    pub rates_api_url: String,
    pub rates_api_key: Option<String>,
    /// Base assumed for provider tables that do not name one
    pub anchor_currency: String,
    pub ingest_interval: Duration,
    /// Number of most recent snapshots averaged by `/average`
    pub average_window: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            rates_api_url: FIXER_API_URL.to_string(),
            rates_api_key: None,
            anchor_currency: DEFAULT_ANCHOR_CURRENCY.to_string(),
            ingest_interval: Duration::from_secs(DAY_SECS),
            average_window: 7,
        }
    }
}

fn env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|v| v.parse().ok())
}

impl ApiConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let host = std::env::var("API_HOST").unwrap_or(defaults.host);
        let port = env_parse("API_PORT").unwrap_or(defaults.port);
        let rates_api_url = std::env::var("RATES_API_URL").unwrap_or(defaults.rates_api_url);
        let rates_api_key = std::env::var("RATES_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        let anchor_currency = std::env::var("ANCHOR_CURRENCY")
            .ok()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(defaults.anchor_currency);
        let ingest_interval = env_parse::<u64>("INGEST_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.ingest_interval);
        let average_window = env_parse::<usize>("AVERAGE_WINDOW")
            .filter(|n| *n > 0)
            .unwrap_or(defaults.average_window);

        Self {
            host,
            port,
            rates_api_url,
            rates_api_key,
            anchor_currency,
            ingest_interval,
            average_window,
        }
    }
}
