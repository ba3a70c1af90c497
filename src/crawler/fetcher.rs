//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client (timeouts, redirects, client identity, TLS)
//! - Streaming headers and body chunks to a `ResponseSink`
//! - Error classification

use crate::config::{load_identity_pem, CrawlConfig, IdentityPaths};
use crate::{ConfigError, HydraError};
use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::{redirect::Policy, Client, Identity, StatusCode};
use std::time::{Duration, Instant};

/// Receives a response while it is being transferred
pub trait ResponseSink {
    /// Called once, when the status line and headers have arrived
    fn on_headers(&mut self, final_url: &str, status: StatusCode, headers: &HeaderMap);

    /// Called for every body chunk, in order
    fn on_chunk(&mut self, chunk: &[u8]);
}

/// Result of a fetch operation
#[derive(Debug)]
pub enum FetchResult {
    /// The server answered; any status code counts as completed
    Completed {
        /// Final URL after redirects
        final_url: String,
        /// HTTP status code
        status_code: u16,
        /// Body bytes received
        bytes: u64,
        /// Time from request start to end of body
        elapsed: Duration,
    },

    /// Connect or request timeout, before or during the body
    Timeout {
        /// Error description
        error: String,
        elapsed: Duration,
    },

    /// Any other transport failure (DNS, refused connection, TLS, ...)
    NetworkError {
        /// Error description
        error: String,
        elapsed: Duration,
    },
}

impl FetchResult {
    fn from_error(error: reqwest::Error, elapsed: Duration) -> Self {
        if error.is_timeout() {
            FetchResult::Timeout {
                error: error.to_string(),
                elapsed,
            }
        } else {
            FetchResult::NetworkError {
                error: error.to_string(),
                elapsed,
            }
        }
    }
}

/// Builds an HTTP client with proper configuration
///
/// A client identity is attached when a certificate is configured.
/// Certificate verification is only disabled when `insecure` is set.
/// Bodies are not decompressed, so byte counts are what came over the wire.
///
/// # Arguments
///
/// * `config` - The crawl configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(HydraError)` - The identity could not be loaded or the client failed to build
///
/// # Example
///
/// ```no_run
/// use hydra::config::CrawlConfig;
/// use hydra::crawler::build_http_client;
///
/// let client = build_http_client(&CrawlConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &CrawlConfig) -> Result<Client, HydraError> {
    let mut builder = Client::builder()
        .use_rustls_tls()
        .user_agent(config.user_agent.as_str())
        .timeout(config.request_timeout())
        .connect_timeout(config.connect_timeout())
        .redirect(Policy::limited(config.max_redirects));

    if let Some(paths) = config.identity_paths() {
        builder = builder.identity(load_identity(&paths)?);
        tracing::info!("Using client certificate {}", paths.cert.display());
    }

    if config.insecure {
        tracing::warn!("TLS certificate verification is disabled");
        builder = builder.danger_accept_invalid_certs(true);
    }

    Ok(builder.build()?)
}

fn load_identity(paths: &IdentityPaths) -> Result<Identity, ConfigError> {
    let pem = load_identity_pem(paths)?;
    Identity::from_pem(&pem).map_err(|e| ConfigError::Identity(e.to_string()))
}

/// Returns true if the `Content-Type` header announces HTML
pub fn is_html(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase().contains("text/html"))
        .unwrap_or(false)
}

/// Fetches a URL, streaming the response into `sink`
///
/// Redirects are followed by the client. The body is never buffered as a
/// whole: each chunk goes to the sink as soon as it arrives.
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Any HTTP response | Completed (status recorded as-is) |
/// | Connect/request timeout | Timeout |
/// | Timeout while reading the body | Timeout |
/// | DNS, refused connection, TLS error | NetworkError |
/// | Too many redirects | NetworkError |
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `sink` - Receives headers and body chunks
///
/// # Returns
///
/// A FetchResult indicating completion or the type of failure
pub async fn fetch_url<S>(client: &Client, url: &str, sink: &mut S) -> FetchResult
where
    S: ResponseSink + Send,
{
    let start = Instant::now();

    let mut response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => return FetchResult::from_error(e, start.elapsed()),
    };

    let status = response.status();
    let final_url = response.url().to_string();
    sink.on_headers(&final_url, status, response.headers());

    let mut bytes: u64 = 0;
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                bytes += chunk.len() as u64;
                sink.on_chunk(&chunk);
            }
            Ok(None) => break,
            Err(e) => return FetchResult::from_error(e, start.elapsed()),
        }
    }

    FetchResult::Completed {
        final_url,
        status_code: status.as_u16(),
        bytes,
        elapsed: start.elapsed(),
    }
}
