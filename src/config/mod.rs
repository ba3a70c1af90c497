//! Configuration module for Hydra
//!
//! This module handles loading, parsing, and validating the optional TOML
//! configuration file, and resolving the client identity.
//!
//! # Example
//!
//! ```no_run
//! use hydra::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("hydra.toml")).unwrap();
//! println!("Crawler will use {} workers", config.max_workers);
//! ```

mod identity;
mod parser;
mod types;
mod validation;

pub use identity::{identity_from_env, load_identity_pem, resolve_identity, IdentityPaths};
pub use parser::{load_config, parse_config};
pub use types::{CrawlConfig, DEFAULT_MAX_WORKERS};
pub use validation::{validate, validate_base_url};
