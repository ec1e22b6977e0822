// crates/artwatch-daemon/src/config.rs
//
// Runtime configuration for the artwatch daemon.
// Loaded from a TOML file or populated with defaults, then overridden by
// environment variables. Unparseable environment values are logged and
// ignored.

use std::fs;
use std::time::Duration;

use serde::Deserialize;

use artwatch_crawler::config::{
    DEFAULT_ALERT_THRESHOLD, DEFAULT_BATCH_CONCURRENCY, DEFAULT_SIMILARITY_THRESHOLD,
    DEFAULT_TAMPER_SIMILARITY_FLOOR,
};
use artwatch_crawler::CrawlerConfig;
use artwatch_store::{DEFAULT_GATEWAYS, DEFAULT_MAX_IMAGE_BYTES};

/// Runtime configuration for the daemon.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DaemonConfig {
    /// Directory for local data storage (RocksDB).
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Address of the control endpoint served by the daemon and used by the CLI.
    #[serde(default = "default_control_addr")]
    pub control_addr: String,

    /// Log level used when RUST_LOG is unset.
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Timeout applied to every outbound HTTP call.
    #[serde(default = "default_http_timeout_secs")]
    pub http_timeout_secs: u64,

    /// Largest image body downloaded, in bytes.
    #[serde(default = "default_max_image_bytes")]
    pub max_image_bytes: usize,

    /// IPFS gateways tried in order when fetching originals.
    #[serde(default = "default_ipfs_gateways")]
    pub ipfs_gateways: Vec<String>,

    /// Gateway used to build the public URL handed to search providers.
    #[serde(default = "default_public_gateway")]
    pub public_gateway: String,

    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    #[serde(default = "default_alert_threshold")]
    pub alert_threshold: f64,

    #[serde(default = "default_tamper_similarity_floor")]
    pub tamper_similarity_floor: f64,

    /// Seconds between scheduled cycles.
    #[serde(default = "default_check_interval_secs")]
    pub check_interval_secs: u64,

    /// Seconds to pause between artworks within a cycle.
    #[serde(default = "default_rate_limit_secs")]
    pub rate_limit_secs: u64,

    #[serde(default = "default_batch_concurrency")]
    pub batch_concurrency: usize,

    #[serde(default)]
    pub google_api_key: Option<String>,

    #[serde(default)]
    pub google_cx: Option<String>,

    #[serde(default)]
    pub tineye_api_key: Option<String>,

    #[serde(default)]
    pub bing_api_key: Option<String>,

    /// When set, alerts are also POSTed here.
    #[serde(default)]
    pub alert_webhook_url: Option<String>,
}

fn default_data_dir() -> String {
    "~/.artwatch/data".to_string()
}

fn default_control_addr() -> String {
    "127.0.0.1:7878".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_http_timeout_secs() -> u64 {
    30
}

fn default_max_image_bytes() -> usize {
    DEFAULT_MAX_IMAGE_BYTES
}

fn default_ipfs_gateways() -> Vec<String> {
    DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect()
}

fn default_public_gateway() -> String {
    "https://ipfs.io/ipfs".to_string()
}

fn default_similarity_threshold() -> f64 {
    DEFAULT_SIMILARITY_THRESHOLD
}

fn default_alert_threshold() -> f64 {
    DEFAULT_ALERT_THRESHOLD
}

fn default_tamper_similarity_floor() -> f64 {
    DEFAULT_TAMPER_SIMILARITY_FLOOR
}

fn default_check_interval_secs() -> u64 {
    60 * 60
}

fn default_rate_limit_secs() -> u64 {
    3
}

fn default_batch_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            control_addr: default_control_addr(),
            log_level: default_log_level(),
            http_timeout_secs: default_http_timeout_secs(),
            max_image_bytes: default_max_image_bytes(),
            ipfs_gateways: default_ipfs_gateways(),
            public_gateway: default_public_gateway(),
            similarity_threshold: default_similarity_threshold(),
            alert_threshold: default_alert_threshold(),
            tamper_similarity_floor: default_tamper_similarity_floor(),
            check_interval_secs: default_check_interval_secs(),
            rate_limit_secs: default_rate_limit_secs(),
            batch_concurrency: default_batch_concurrency(),
            google_api_key: None,
            google_cx: None,
            tineye_api_key: None,
            bing_api_key: None,
            alert_webhook_url: None,
        }
    }
}

impl DaemonConfig {
    /// Load configuration from a TOML file at the given path.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: DaemonConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_env_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        override_parsed(&lookup, "CRAWLER_SIMILARITY_THRESHOLD", &mut self.similarity_threshold, parse_ratio);
        override_parsed(&lookup, "CRAWLER_ALERT_THRESHOLD", &mut self.alert_threshold, parse_ratio);
        override_parsed(&lookup, "CRAWLER_TAMPER_FLOOR", &mut self.tamper_similarity_floor, parse_ratio);
        override_parsed(&lookup, "CRAWLER_CHECK_INTERVAL", &mut self.check_interval_secs, |v| {
            parse_duration(v).map(|d| d.as_secs()).filter(|s| *s > 0)
        });
        override_parsed(&lookup, "CRAWLER_RATE_LIMIT", &mut self.rate_limit_secs, |v| {
            parse_duration(v).map(|d| d.as_secs())
        });
        override_parsed(&lookup, "CRAWLER_BATCH_CONCURRENCY", &mut self.batch_concurrency, |v| {
            v.trim().parse::<usize>().ok().filter(|n| *n > 0)
        });

        override_secret(&lookup, "GOOGLE_API_KEY", &mut self.google_api_key);
        override_secret(&lookup, "GOOGLE_CX", &mut self.google_cx);
        override_secret(&lookup, "TINEYE_API_KEY", &mut self.tineye_api_key);
        override_secret(&lookup, "BING_API_KEY", &mut self.bing_api_key);
        override_secret(&lookup, "ALERT_WEBHOOK_URL", &mut self.alert_webhook_url);

        if let Some(addr) = lookup("ARTWATCH_CONTROL_ADDR").filter(|v| !v.trim().is_empty()) {
            self.control_addr = addr.trim().to_string();
        }
    }

    /// Crawler settings derived from this configuration.
    pub fn crawler_config(&self) -> CrawlerConfig {
        CrawlerConfig {
            similarity_threshold: self.similarity_threshold,
            alert_threshold: self.alert_threshold,
            tamper_similarity_floor: self.tamper_similarity_floor,
            check_interval: Duration::from_secs(self.check_interval_secs),
            rate_limit_delay: Duration::from_secs(self.rate_limit_secs),
            batch_concurrency: self.batch_concurrency,
        }
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    /// URL of the control endpoint's RPC route.
    pub fn control_url(&self) -> String {
        format!("http://{}/rpc", self.control_addr)
    }
}

fn override_parsed<F, T, P>(lookup: &F, key: &str, target: &mut T, parse: P)
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let Some(raw) = lookup(key) else {
        return;
    };
    match parse(&raw) {
        Some(value) => *target = value,
        None => tracing::warn!("Ignoring invalid {}={:?}", key, raw),
    }
}

fn override_secret<F>(lookup: &F, key: &str, target: &mut Option<String>)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(key).filter(|v| !v.trim().is_empty()) {
        *target = Some(value);
    }
}

fn parse_ratio(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| (0.0..=1.0).contains(v))
}

/// Parse `90s`, `15m`, `1h`, or bare seconds.
pub fn parse_duration(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let (digits, unit) = match raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
        Some((i, _)) => raw.split_at(i),
        None => (raw, "s"),
    };
    let value: u64 = digits.parse().ok()?;
    let multiplier = match unit.trim() {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => return None,
    };
    value.checked_mul(multiplier).map(Duration::from_secs)
}

/// Expand `~` at the start of a path to the user's home directory.
pub fn expand_tilde(path: &str) -> String {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return format!("{}/{}", home.display(), rest);
        }
    }
    path.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_produce_valid_crawler_config() {
        let config = DaemonConfig::default();
        assert_eq!(config.http_timeout_secs, 30);
        assert_eq!(config.max_image_bytes, 20 * 1024 * 1024);
        assert_eq!(config.control_url(), "http://127.0.0.1:7878/rpc");
        assert_eq!(config.ipfs_gateways.len(), 3);
        let crawler = config.crawler_config();
        assert!(crawler.validate().is_ok());
        assert_eq!(crawler, CrawlerConfig::default());
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: DaemonConfig = toml::from_str(
            r#"
            data_dir = "/var/lib/artwatch"
            similarity_threshold = 0.75
            google_api_key = "abc"
            "#,
        )
        .unwrap();
        assert_eq!(config.data_dir, "/var/lib/artwatch");
        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.google_api_key.as_deref(), Some("abc"));
        assert_eq!(config.alert_threshold, 0.80);
        assert_eq!(config.check_interval_secs, 3600);
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut config = DaemonConfig::default();
        config.apply_env_from(env(&[
            ("CRAWLER_SIMILARITY_THRESHOLD", "0.75"),
            ("CRAWLER_CHECK_INTERVAL", "15m"),
            ("CRAWLER_BATCH_CONCURRENCY", "2"),
            ("BING_API_KEY", "bing-key"),
            ("ARTWATCH_CONTROL_ADDR", "0.0.0.0:9000"),
        ]));
        assert_eq!(config.control_url(), "http://0.0.0.0:9000/rpc");
        assert_eq!(config.similarity_threshold, 0.75);
        assert_eq!(config.check_interval_secs, 900);
        assert_eq!(config.batch_concurrency, 2);
        assert_eq!(config.bing_api_key.as_deref(), Some("bing-key"));
    }

    #[test]
    fn bad_environment_values_are_ignored() {
        let mut config = DaemonConfig::default();
        config.apply_env_from(env(&[
            ("CRAWLER_SIMILARITY_THRESHOLD", "lots"),
            ("CRAWLER_ALERT_THRESHOLD", "1.5"),
            ("CRAWLER_CHECK_INTERVAL", "soon"),
            ("CRAWLER_BATCH_CONCURRENCY", "0"),
            ("GOOGLE_API_KEY", "   "),
        ]));
        assert_eq!(config, DaemonConfig::default());
    }

    #[test]
    fn parses_duration_forms() {
        assert_eq!(parse_duration("90s"), Some(Duration::from_secs(90)));
        assert_eq!(parse_duration("15m"), Some(Duration::from_secs(900)));
        assert_eq!(parse_duration("1h"), Some(Duration::from_secs(3600)));
        assert_eq!(parse_duration("45"), Some(Duration::from_secs(45)));
        assert_eq!(parse_duration(""), None);
        assert_eq!(parse_duration("h"), None);
        assert_eq!(parse_duration("10d"), None);
    }

    #[test]
    fn tilde_is_left_alone_without_prefix() {
        assert_eq!(expand_tilde("/abs/path"), "/abs/path");
    }
}
