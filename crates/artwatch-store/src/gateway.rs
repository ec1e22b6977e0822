// crates/artwatch-store/src/gateway.rs
//
// Multi-gateway IPFS fetcher for registered originals.
//
// A content reference (CID) is resolved against each configured gateway in
// order: `{gateway}/{cid}`. The first success wins; if every gateway fails the
// last error is surfaced. Absolute http(s) references bypass the chain.

use async_trait::async_trait;

use artwatch_core::{ArtwatchError, ImageFetcher};

use crate::http::HttpFetcher;

/// Public gateways tried when none are configured.
pub const DEFAULT_GATEWAYS: [&str; 3] = [
    "https://gateway.pinata.cloud/ipfs",
    "https://ipfs.io/ipfs",
    "https://cloudflare-ipfs.com/ipfs",
];

/// Fetches content-addressed images through a fallback chain of gateways.
#[derive(Debug, Clone)]
pub struct GatewayFetcher {
    /// Gateway base URLs, tried in order.
    gateways: Vec<String>,
    http: HttpFetcher,
}

impl GatewayFetcher {
    /// Create a fetcher over the given gateway base URLs.
    pub fn new(gateways: Vec<String>, http: HttpFetcher) -> Self {
        let gateways = gateways
            .into_iter()
            .map(|g| g.trim_end_matches('/').to_string())
            .filter(|g| !g.is_empty())
            .collect();
        Self { gateways, http }
    }

    /// Fetcher over `DEFAULT_GATEWAYS`.
    pub fn with_default_gateways(http: HttpFetcher) -> Self {
        Self::new(DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(), http)
    }

    pub fn gateways(&self) -> &[String] {
        &self.gateways
    }

    /// Full URL of `cid` on a gateway.
    pub fn url_for(gateway: &str, cid: &str) -> String {
        format!("{}/{}", gateway, cid.trim_start_matches('/'))
    }
}

#[async_trait]
impl ImageFetcher for GatewayFetcher {
    async fn fetch(&self, reference: &str) -> Result<Vec<u8>, ArtwatchError> {
        if reference.starts_with("http://") || reference.starts_with("https://") {
            return self.http.get_bytes(reference).await;
        }

        let mut last_err = None;

        for gateway in &self.gateways {
            let url = Self::url_for(gateway, reference);
            match self.http.get_bytes(&url).await {
                Ok(bytes) => return Ok(bytes),
                Err(e) => {
                    tracing::debug!("Gateway {} failed for {}: {}", gateway, reference, e);
                    last_err = Some(e);
                }
            }
        }

        match last_err {
            Some(e) => Err(ArtwatchError::Network(format!("all gateways failed: {}", e))),
            None => Err(ArtwatchError::Configuration(
                "no IPFS gateways configured".to_string(),
            )),
        }
    }
}
