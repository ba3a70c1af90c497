//! Hydra: a concurrent link crawler
//!
//! This crate implements a multi-worker crawler that starts from a seed URL,
//! follows every `<a href>` found in HTML responses, and records one log line
//! per fetch until the crawl drains or is interrupted.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Hydra operations
#[derive(Debug, Error)]
pub enum HydraError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to read client identity file {path}: {source}")]
    IdentityFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid client identity: {0}")]
    Identity(String),
}

/// Result type alias for Hydra operations
pub type Result<T> = std::result::Result<T, HydraError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::CrawlConfig;
pub use crawler::{Coordinator, CrawlOutcome};
pub use output::RunStats;
pub use state::{Classification, FetchOutcome};
