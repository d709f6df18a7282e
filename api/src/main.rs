use api::{config::ApiConfig, ingest::IngestionJob, service::RateService};
use connectors::{fixer::FixerConnector, webhook::HttpWebhookNotifier};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    info!("Starting ratewatch API");

    let config = ApiConfig::from_env();
    let store_config = store::StoreConfig::from_env();

    let stores = store::open(&store_config)
        .map_err(|e| format!("Failed to open store: {}", e))?;

    let provider = Arc::new(FixerConnector::new(
        &config.rates_api_url,
        config.rates_api_key.clone(),
        &config.anchor_currency,
    ));
    let notifier = Arc::new(HttpWebhookNotifier::new());

    let service = Arc::new(RateService::new(
        provider,
        stores,
        notifier,
        config.average_window,
    ));

    IngestionJob::new(service.clone(), config.ingest_interval).spawn();

    let app = api::router(service);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| format!("Invalid listen address: {}", e))?;
    info!("Listening on {}", addr);

    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
