//! Trail provider trait and structured error types.
//!
//! The `TrailProvider` trait abstracts over trail sources (the timed-trading
//! HTTP service, the synthetic generator) so the loader can swap them and
//! tests can mock them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::wire::RawTrailPoint;

/// Structured error types for data operations.
///
/// Displayable in CLI logs; per-instrument errors are skip reasons, not fatal.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} for {url}")]
    HttpStatus { status: u16, url: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Where the trail data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    TimedApi,
    Synthetic,
}

impl DataSource {
    pub fn as_str(self) -> &'static str {
        match self {
            DataSource::TimedApi => "timed_api",
            DataSource::Synthetic => "synthetic",
        }
    }
}

/// Trait for trail providers.
///
/// Implementations only fetch; sorting, window filtering and history checks
/// happen in `prepare_trail` above this trait.
pub trait TrailProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    /// The instrument universe.
    fn fetch_universe(&self) -> Result<Vec<String>, DataError>;

    /// Raw trail records for one instrument since `since_ms`, at most `limit`.
    fn fetch_trail(
        &self,
        ticker: &str,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<RawTrailPoint>, DataError>;
}
