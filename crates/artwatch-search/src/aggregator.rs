// crates/artwatch-search/src/aggregator.rs
//
// SearchAggregator: concurrent fan-out to every enabled search backend.
//
// Failure policy:
//   - Disabled backends are dropped at construction and never counted.
//   - A failing backend is logged and excluded from the merge.
//   - The call errors only when every attempted backend failed.
//   - Zero enabled backends yields an empty, successful result.
//
// Merge order is backend dispatch order, then backend-internal order.
// Repeated URLs are dropped (first occurrence wins).

use std::collections::HashSet;
use std::sync::Arc;

use futures::future::join_all;

use artwatch_core::{ArtwatchError, Candidate, SearchBackend};

/// Fans a lookup out to all enabled backends and merges the results.
#[derive(Clone)]
pub struct SearchAggregator {
    backends: Vec<Arc<dyn SearchBackend>>,
}

impl SearchAggregator {
    /// Build an aggregator, keeping only backends whose credentials are present.
    pub fn new(backends: Vec<Arc<dyn SearchBackend>>) -> Self {
        let backends: Vec<Arc<dyn SearchBackend>> = backends
            .into_iter()
            .filter(|backend| {
                if backend.is_enabled() {
                    tracing::info!("Search backend enabled: {}", backend.name());
                    true
                } else {
                    tracing::info!(
                        "Search backend disabled (no credentials): {}",
                        backend.name()
                    );
                    false
                }
            })
            .collect();
        Self { backends }
    }

    /// Names of the enabled backends, in dispatch order.
    pub fn enabled_backends(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    /// Query every enabled backend and merge their candidates.
    pub async fn search(&self, content_ref: &str) -> Result<Vec<Candidate>, ArtwatchError> {
        if self.backends.is_empty() {
            tracing::debug!("No search backends enabled, skipping lookup for {}", content_ref);
            return Ok(Vec::new());
        }

        let outcomes = join_all(self.backends.iter().map(|backend| async move {
            (backend.name(), backend.search(content_ref).await)
        }))
        .await;

        let mut merged = Vec::new();
        let mut seen = HashSet::new();
        let mut failures = Vec::new();

        for (name, outcome) in outcomes {
            match outcome {
                Ok(candidates) => {
                    tracing::debug!("{} returned {} candidates", name, candidates.len());
                    for candidate in candidates {
                        if candidate.url.is_empty() {
                            continue;
                        }
                        if seen.insert(candidate.url.clone()) {
                            merged.push(candidate);
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!("{} search failed for {}: {}", name, content_ref, e);
                    failures.push(format!("{}: {}", name, e));
                }
            }
        }

        if failures.len() == self.backends.len() {
            return Err(ArtwatchError::SearchFailed(format!(
                "all search backends failed ({})",
                failures.join("; ")
            )));
        }

        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct StubBackend {
        name: &'static str,
        enabled: bool,
        result: Result<Vec<&'static str>, &'static str>,
    }

    #[async_trait]
    impl SearchBackend for StubBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn is_enabled(&self) -> bool {
            self.enabled
        }

        async fn search(&self, _content_ref: &str) -> Result<Vec<Candidate>, ArtwatchError> {
            match &self.result {
                Ok(urls) => Ok(urls.iter().map(|u| Candidate::new(*u, None)).collect()),
                Err(msg) => Err(ArtwatchError::Network(msg.to_string())),
            }
        }
    }

    fn stub(
        name: &'static str,
        enabled: bool,
        result: Result<Vec<&'static str>, &'static str>,
    ) -> Arc<dyn SearchBackend> {
        Arc::new(StubBackend {
            name,
            enabled,
            result,
        })
    }

    fn urls(candidates: &[Candidate]) -> Vec<&str> {
        candidates.iter().map(|c| c.url.as_str()).collect()
    }

    #[tokio::test]
    async fn partial_failure_returns_surviving_candidates() {
        let agg = SearchAggregator::new(vec![
            stub("google", true, Err("timeout")),
            stub("tineye", true, Ok(vec!["https://a/1.png", "https://a/2.png"])),
            stub("bing", true, Err("status 500")),
        ]);
        let result = agg.search("QmArt").await.unwrap();
        assert_eq!(urls(&result), vec!["https://a/1.png", "https://a/2.png"]);
    }

    #[tokio::test]
    async fn all_enabled_failing_is_an_error() {
        let agg = SearchAggregator::new(vec![
            stub("google", true, Err("timeout")),
            stub("tineye", true, Err("status 403")),
            stub("bing", true, Err("bad json")),
        ]);
        match agg.search("QmArt").await {
            Err(ArtwatchError::SearchFailed(msg)) => {
                assert!(msg.contains("google"));
                assert!(msg.contains("bing"));
            }
            other => panic!("Expected SearchFailed, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn zero_enabled_backends_is_empty_success() {
        let agg = SearchAggregator::new(vec![
            stub("google", false, Err("never called")),
            stub("bing", false, Err("never called")),
        ]);
        assert!(agg.enabled_backends().is_empty());
        assert!(agg.search("QmArt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn disabled_backends_do_not_count_as_failures() {
        let agg = SearchAggregator::new(vec![
            stub("google", false, Err("never called")),
            stub("tineye", true, Ok(vec![])),
        ]);
        assert_eq!(agg.enabled_backends(), vec!["tineye"]);
        assert!(agg.search("QmArt").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn merge_keeps_dispatch_order_and_drops_duplicates() {
        let agg = SearchAggregator::new(vec![
            stub("google", true, Ok(vec!["https://x/1", "https://x/2"])),
            stub("tineye", true, Ok(vec!["https://x/2", "", "https://x/3"])),
            stub("bing", true, Ok(vec!["https://x/1", "https://x/4"])),
        ]);
        let result = agg.search("QmArt").await.unwrap();
        assert_eq!(
            urls(&result),
            vec!["https://x/1", "https://x/2", "https://x/3", "https://x/4"]
        );
    }
}
