use crate::config::identity::IdentityPaths;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_MAX_WORKERS: usize = 5;

/// Crawl configuration, assembled from defaults, an optional TOML file
/// and command-line overrides
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Number of concurrent workers
    #[serde(rename = "max-workers")]
    pub max_workers: usize,

    /// How often the coordinator samples worker activity (milliseconds)
    #[serde(rename = "monitor-interval-ms")]
    pub monitor_interval_ms: u64,

    /// TCP/TLS connect timeout (seconds)
    #[serde(rename = "connect-timeout-secs")]
    pub connect_timeout_secs: u64,

    /// Whole-request timeout, body included (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// Maximum number of redirects followed per fetch
    #[serde(rename = "max-redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// Directory where the run log is written
    #[serde(rename = "log-dir")]
    pub log_dir: PathBuf,

    /// Skip TLS certificate verification
    pub insecure: bool,

    /// Client certificate (PEM)
    pub cert: Option<PathBuf>,

    /// Client private key (PEM); defaults to the certificate file
    pub key: Option<PathBuf>,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            monitor_interval_ms: 1000,
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            max_redirects: 10,
            user_agent: format!("hydra/{}", env!("CARGO_PKG_VERSION")),
            log_dir: PathBuf::from("."),
            insecure: false,
            cert: None,
            key: None,
        }
    }
}

impl CrawlConfig {
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Fills the certificate and key independently from `fallback`
    ///
    /// A path already set (by the config file or a flag) is kept.
    pub fn fill_identity(&mut self, fallback: Option<IdentityPaths>) {
        if let Some(fallback) = fallback {
            if self.cert.is_none() {
                self.cert = Some(fallback.cert);
            }
            if self.key.is_none() {
                self.key = Some(fallback.key);
            }
        }
    }

    /// Certificate and key to present, if a certificate is configured
    ///
    /// Without an explicit key, the certificate file is expected to hold both.
    pub fn identity_paths(&self) -> Option<IdentityPaths> {
        let cert = self.cert.clone()?;
        let key = self.key.clone().unwrap_or_else(|| cert.clone());
        Some(IdentityPaths { cert, key })
    }
}
