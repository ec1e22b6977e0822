// crates/artwatch-daemon/src/wiring.rs
//
// Builds a ready-to-run `Crawler` from a `DaemonConfig`: one shared HTTP
// client, the gateway chain for originals, direct HTTP for candidates, every
// search backend (disabled ones are filtered by the aggregator), and the
// configured alert sink.

use std::sync::Arc;

use artwatch_core::{Alerter, ArtworkStore, SearchBackend};
use artwatch_crawler::{Crawler, LogAlerter, WebhookAlerter};
use artwatch_search::{BingBackend, GoogleBackend, SearchAggregator, TinEyeBackend};
use artwatch_store::{GatewayFetcher, HttpFetcher, RocksStore};

use crate::config::{expand_tilde, DaemonConfig};

/// Open (creating if needed) the RocksDB store under `data_dir`.
pub fn open_store(config: &DaemonConfig) -> Result<Arc<RocksStore>, Box<dyn std::error::Error>> {
    let db_path = format!("{}/rocksdb", expand_tilde(&config.data_dir));
    std::fs::create_dir_all(&db_path)?;
    let store = RocksStore::open(&db_path)
        .map_err(|e| format!("Failed to open RocksDB at {}: {}", db_path, e))?;
    tracing::info!("RocksStore opened at {}", db_path);
    Ok(Arc::new(store))
}

/// Wire every crawler dependency against `store`.
pub fn build_crawler(
    config: &DaemonConfig,
    store: Arc<dyn ArtworkStore>,
) -> Result<Crawler, Box<dyn std::error::Error>> {
    let crawler_config = config.crawler_config();
    crawler_config.validate()?;

    let client = reqwest::Client::builder()
        .timeout(config.http_timeout())
        .build()?;

    let http = HttpFetcher::with_client(client.clone()).with_max_bytes(config.max_image_bytes);
    let gateways = GatewayFetcher::new(config.ipfs_gateways.clone(), http.clone());

    let backends: Vec<Arc<dyn SearchBackend>> = vec![
        Arc::new(GoogleBackend::new(
            config.google_api_key.clone(),
            config.google_cx.clone(),
            &config.public_gateway,
            client.clone(),
        )),
        Arc::new(TinEyeBackend::new(
            config.tineye_api_key.clone(),
            &config.public_gateway,
            client.clone(),
        )),
        Arc::new(BingBackend::new(
            config.bing_api_key.clone(),
            &config.public_gateway,
            client.clone(),
        )),
    ];
    let search = SearchAggregator::new(backends);
    if search.enabled_backends().is_empty() {
        tracing::warn!("No search backends configured; scans will find nothing");
    }

    let alerter: Arc<dyn Alerter> = match &config.alert_webhook_url {
        Some(url) => {
            tracing::info!("Alert webhook: {}", url);
            Arc::new(WebhookAlerter::new(url.clone(), client))
        }
        None => Arc::new(LogAlerter),
    };

    let crawler = Crawler::new(
        crawler_config,
        store,
        search,
        Arc::new(gateways),
        Arc::new(http),
    )?
    .with_alerter(alerter);

    Ok(crawler)
}
