//! Hydra main entry point
//!
//! This is the command-line interface for the Hydra link crawler.

use anyhow::Context;
use clap::Parser;
use hydra::config::{identity_from_env, load_config, validate, validate_base_url, CrawlConfig};
use hydra::crawler::crawl;
use hydra::output::print_statistics;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Hydra: a concurrent link crawler
///
/// Hydra fetches the base URL, follows every link found in HTML pages with a
/// pool of workers, and logs one line per fetch to `hydra-<host>.log`.
/// The client certificate and key default to `X509_USER_PROXY`, or to
/// `X509_USER_CERT` and `X509_USER_KEY` when both are set.
#[derive(Parser, Debug)]
#[command(name = "hydra")]
#[command(version)]
#[command(about = "A concurrent link crawler", long_about = None)]
struct Cli {
    /// URL the crawl starts from; links are appended to it verbatim
    #[arg(value_name = "BASE_URL")]
    base_url: String,

    /// User certificate (PEM)
    #[arg(short, long, value_name = "PATH")]
    cert: Option<PathBuf>,

    /// User private key (PEM)
    #[arg(short, long, value_name = "PATH")]
    key: Option<PathBuf>,

    /// Maximum number of workers
    #[arg(short, long, value_name = "N")]
    max: Option<usize>,

    /// Optional TOML configuration file
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Directory for the run log
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Do not verify server TLS certificates (unsafe)
    #[arg(long)]
    insecure: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress progress output and non-error logs
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    tracing::debug!("Effective configuration: {:?}", config);

    let outcome = match crawl(config, &cli.base_url, !cli.quiet).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            eprintln!("{}", e);
            return ExitCode::from(2);
        }
    };

    if !cli.quiet {
        println!();
        print_statistics(&outcome.stats, outcome.elapsed);
        println!("Run log: {}", outcome.log_path.display());
    }

    if outcome.is_success() {
        tracing::info!("Crawl completed successfully");
        ExitCode::SUCCESS
    } else {
        tracing::warn!("Crawl was interrupted before draining");
        ExitCode::from(1)
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// Logs go to stderr; stdout carries the progress line.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("hydra=info,warn"),
            1 => EnvFilter::new("hydra=debug,info"),
            2 => EnvFilter::new("hydra=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Layers defaults, the config file, command-line flags and the environment
fn build_config(cli: &Cli) -> anyhow::Result<CrawlConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            load_config(path).with_context(|| {
                format!("Failed to load configuration from {}", path.display())
            })?
        }
        None => CrawlConfig::default(),
    };

    if let Some(max) = cli.max {
        config.max_workers = max;
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = dir.clone();
    }
    if cli.insecure {
        config.insecure = true;
    }

    if let Some(cert) = &cli.cert {
        config.cert = Some(cert.clone());
    }
    if let Some(key) = &cli.key {
        config.key = Some(key.clone());
    }
    config.fill_identity(identity_from_env());

    validate(&config).context("Invalid configuration")?;
    validate_base_url(&cli.base_url).context("Invalid base URL")?;

    Ok(config)
}
