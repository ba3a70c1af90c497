use crate::config::types::CrawlConfig;
use crate::ConfigError;
use url::Url;

const MAX_WORKERS_LIMIT: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_workers(config)?;
    validate_timing(config)?;

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    validate_identity(config)?;
    Ok(())
}

fn validate_workers(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.max_workers < 1 || config.max_workers > MAX_WORKERS_LIMIT {
        return Err(ConfigError::Validation(format!(
            "max-workers must be between 1 and {}, got {}",
            MAX_WORKERS_LIMIT, config.max_workers
        )));
    }
    Ok(())
}

fn validate_timing(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.monitor_interval_ms < 10 {
        return Err(ConfigError::Validation(format!(
            "monitor-interval-ms must be >= 10ms, got {}ms",
            config.monitor_interval_ms
        )));
    }

    if config.connect_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "connect-timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// A key is useless without a certificate; a certificate alone may carry its key
fn validate_identity(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.cert.is_none() && config.key.is_some() {
        return Err(ConfigError::Validation(
            "a client private key was given without a certificate".to_string(),
        ));
    }
    Ok(())
}

/// Checks that the seed is an absolute http(s) URL
///
/// The seed is only validated, never rewritten: discovered links are built
/// by concatenating onto the exact string the user supplied.
pub fn validate_base_url(base_url: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("'{}': {}", base_url, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::InvalidUrl(format!(
            "'{}': unsupported scheme '{}'",
            base_url, other
        ))),
    }
}
