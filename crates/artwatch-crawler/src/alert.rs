// crates/artwatch-crawler/src/alert.rs
//
// Alert sinks for high-similarity findings. Both are fire-and-forget: they
// never block the scan and never surface delivery failures to the caller.

use serde::Serialize;

use artwatch_core::{Alerter, Artwork, Finding};

/// Emits a structured warning per alert. The default sink.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlerter;

impl Alerter for LogAlerter {
    fn alert(&self, artwork: &Artwork, finding: &Finding) {
        tracing::warn!(
            artwork_id = %artwork.id,
            owner_id = %artwork.owner_id,
            finding_id = %finding.id,
            url = %finding.found_url,
            similarity = finding.similarity_score,
            tampered = finding.tamper_detected,
            "High-similarity match detected"
        );
    }
}

#[derive(Serialize)]
struct AlertPayload<'a> {
    artwork_id: &'a str,
    owner_id: &'a str,
    finding: &'a Finding,
}

/// POSTs a JSON payload to a webhook on a background task.
#[derive(Debug, Clone)]
pub struct WebhookAlerter {
    url: String,
    client: reqwest::Client,
}

impl WebhookAlerter {
    pub fn new(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Alerter for WebhookAlerter {
    fn alert(&self, artwork: &Artwork, finding: &Finding) {
        // Log first so the alert is recorded even if delivery fails.
        LogAlerter.alert(artwork, finding);

        let body = match serde_json::to_vec(&AlertPayload {
            artwork_id: &artwork.id,
            owner_id: &artwork.owner_id,
            finding,
        }) {
            Ok(body) => body,
            Err(e) => {
                tracing::warn!("Failed to encode alert payload: {}", e);
                return;
            }
        };

        let handle = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                tracing::warn!("No runtime available, dropping webhook alert for {}", finding.id);
                return;
            }
        };

        let client = self.client.clone();
        let url = self.url.clone();
        let finding_id = finding.id.clone();
        handle.spawn(async move {
            let result = client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body)
                .send()
                .await;
            match result {
                Ok(resp) if resp.status().is_success() => {
                    tracing::debug!("Delivered alert for finding {}", finding_id);
                }
                Ok(resp) => {
                    tracing::warn!(
                        "Alert webhook returned {} for finding {}",
                        resp.status(),
                        finding_id
                    );
                }
                Err(e) => {
                    tracing::warn!("Alert webhook failed for finding {}: {}", finding_id, e);
                }
            }
        });
    }
}
