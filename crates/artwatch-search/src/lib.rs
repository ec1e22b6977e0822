// crates/artwatch-search/src/lib.rs
//
// artwatch-search: Reverse-image search for artwatch.
//
// One `SearchBackend` implementation per provider. A backend is enabled only
// when its credentials are present; the `SearchAggregator` fans out to the
// enabled set and merges their candidates.

pub mod aggregator;
pub mod bing;
pub mod google;
pub mod tineye;

#[cfg(test)]
pub(crate) mod mock;

pub use aggregator::SearchAggregator;
pub use bing::BingBackend;
pub use google::GoogleBackend;
pub use tineye::TinEyeBackend;

use artwatch_core::ArtwatchError;

/// Public URL under which search providers can fetch the original image.
///
/// References that are already absolute URLs pass through unchanged; CIDs are
/// joined onto the public gateway base.
pub fn public_image_url(gateway_base: &str, content_ref: &str) -> String {
    if content_ref.starts_with("http://") || content_ref.starts_with("https://") {
        return content_ref.to_string();
    }
    format!(
        "{}/{}",
        gateway_base.trim_end_matches('/'),
        content_ref.trim_start_matches('/')
    )
}

/// Map a response status to a `Network` error when not 2xx.
pub(crate) fn check_status(provider: &str, response: &reqwest::Response) -> Result<(), ArtwatchError> {
    if response.status().is_success() {
        Ok(())
    } else {
        Err(ArtwatchError::Network(format!(
            "{} API returned status {}",
            provider,
            response.status()
        )))
    }
}

/// Treat empty strings as absent credentials.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_joins_cid() {
        assert_eq!(
            public_image_url("https://gateway.pinata.cloud/ipfs/", "QmABC"),
            "https://gateway.pinata.cloud/ipfs/QmABC"
        );
    }

    #[test]
    fn public_url_passes_absolute_urls() {
        assert_eq!(
            public_image_url("https://gw/ipfs", "https://cdn.example.com/a.png"),
            "https://cdn.example.com/a.png"
        );
    }

    #[test]
    fn blank_credentials_are_absent() {
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("k".to_string())), Some("k".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
