/// Fetch outcome definitions and their classification
use std::fmt;
use std::time::Duration;

/// Status recorded for a fetch that failed before producing an HTTP status
pub const STATUS_UNCLASSIFIED: u16 = 0;

/// Status recorded for a fetch that timed out (libcurl's timeout code)
pub const STATUS_TIMEOUT: u16 = 28;

/// How a completed fetch counts towards the run statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Classification {
    /// 2xx response (300 included)
    Passed,

    /// Service unavailable or timed out; the target may be overloaded
    Overloaded,

    /// Any other status, including transport failures
    Failed,
}

impl Classification {
    /// Classifies a recorded status code
    pub fn of(status: u16) -> Self {
        match status {
            200..=300 => Self::Passed,
            503 | STATUS_TIMEOUT => Self::Overloaded,
            _ => Self::Failed,
        }
    }
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Passed => "passed",
            Self::Overloaded => "overloaded",
            Self::Failed => "failed",
        };
        write!(f, "{}", s)
    }
}

/// Result of one fetch, as reported by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutcome {
    /// Effective URL (after redirects), or the requested URL on error
    pub url: String,

    /// HTTP status, or one of the pseudo-statuses for transport errors
    pub status: u16,

    /// Body bytes downloaded
    pub bytes: u64,

    /// Total transfer time
    pub elapsed: Duration,
}

impl FetchOutcome {
    /// A fetch that produced an HTTP response
    pub fn completed(url: impl Into<String>, status: u16, bytes: u64, elapsed: Duration) -> Self {
        Self {
            url: url.into(),
            status,
            bytes,
            elapsed,
        }
    }

    /// A fetch that hit the connect or request timeout
    pub fn timed_out(url: impl Into<String>, elapsed: Duration) -> Self {
        Self::completed(url, STATUS_TIMEOUT, 0, elapsed)
    }

    /// A fetch that failed for any other reason
    pub fn failed(url: impl Into<String>, elapsed: Duration) -> Self {
        Self::completed(url, STATUS_UNCLASSIFIED, 0, elapsed)
    }

    pub fn classification(&self) -> Classification {
        Classification::of(self.status)
    }

    /// Formats the run log line: `[<status>:<bytes>:<seconds>] <url>`
    pub fn log_line(&self) -> String {
        format!(
            "[{:03}:{}:{}] {}",
            self.status,
            self.bytes,
            self.elapsed.as_secs(),
            self.url
        )
    }
}
