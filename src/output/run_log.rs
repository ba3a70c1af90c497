//! Per-run fetch log
//!
//! One file per run, named after the host the crawl runs on. Every report
//! appends exactly one line and is flushed immediately.

use crate::state::FetchOutcome;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

/// Append-only log with one line per finished fetch
#[derive(Debug)]
pub struct RunLog {
    path: PathBuf,
    file: Mutex<File>,
}

impl RunLog {
    /// Creates (truncating) `hydra-<host>.log` inside `dir`
    pub fn create(dir: &Path) -> io::Result<Self> {
        Self::create_at(dir.join(log_file_name(&host_name())))
    }

    /// Creates (truncating) a log at an explicit path
    pub fn create_at(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let file = File::create(&path)?;
        tracing::debug!("Run log opened at {}", path.display());
        Ok(Self {
            path,
            file: Mutex::new(file),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends the outcome's line and flushes it to disk
    pub fn append(&self, outcome: &FetchOutcome) -> io::Result<()> {
        let mut line = outcome.log_line();
        line.push('\n');

        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.write_all(line.as_bytes())?;
        file.flush()
    }
}

/// Name of the run log for the given host
pub fn log_file_name(host: &str) -> String {
    format!("hydra-{}.log", host)
}

/// Host name of this machine, or `localhost` if it cannot be determined
pub fn host_name() -> String {
    let name = gethostname::gethostname().to_string_lossy().trim().to_string();
    if name.is_empty() {
        "localhost".to_string()
    } else {
        name
    }
}
