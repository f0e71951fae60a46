//! Serializable run configuration.
//!
//! Every field has a default, so an empty TOML file (or no file at all) is a
//! complete configuration. CLI flags are applied on top by the binary.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use scorelab_core::data::DEFAULT_API_BASE;
use scorelab_core::domain::{TimeWindow, MS_PER_DAY};
use scorelab_core::{BacktestParams, ParamsError};

/// Errors from loading or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid backtest params: {0}")]
    Params(#[from] ParamsError),

    #[error("window is empty: since {since_ms} is not before until {until_ms}")]
    EmptyWindow { since_ms: i64, until_ms: i64 },

    #[error("invalid report config: {0}")]
    Report(String),

    #[error("invalid source config: {0}")]
    Source(String),
}

/// Complete configuration for one backtest run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub window: WindowConfig,
    pub params: BacktestParams,
    pub report: ReportConfig,
    pub source: SourceConfig,
    pub output: OutputConfig,
}

impl BacktestConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.params.validate()?;
        self.report.validate()?;
        if self.source.limit == 0 {
            return Err(ConfigError::Source("limit must be at least 1".into()));
        }
        if self.source.api_base.trim().is_empty() {
            return Err(ConfigError::Source("api_base must not be empty".into()));
        }
        Ok(())
    }
}

/// Backtest window. Dates are UTC calendar days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    /// Window length ending now, used when `since` is absent.
    pub days: u32,
    /// Explicit start, at UTC midnight.
    pub since: Option<NaiveDate>,
    /// Explicit end, inclusive of the whole day.
    pub until: Option<NaiveDate>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            days: 14,
            since: None,
            until: None,
        }
    }
}

impl WindowConfig {
    /// Resolve to epoch-millisecond bounds relative to `now_ms`.
    pub fn resolve(&self, now_ms: i64) -> Result<TimeWindow, ConfigError> {
        let since_ms = match self.since {
            Some(date) => midnight_ms(date),
            None => now_ms - i64::from(self.days) * MS_PER_DAY,
        };
        let until_ms = match self.until {
            Some(date) => midnight_ms(date) + MS_PER_DAY,
            None => now_ms,
        };
        if since_ms >= until_ms {
            return Err(ConfigError::EmptyWindow { since_ms, until_ms });
        }
        Ok(TimeWindow::new(since_ms, until_ms))
    }
}

fn midnight_ms(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp_millis()
}

/// Shape of the aggregated report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Ascending lower edges; the last bucket is open-ended.
    pub bucket_edges: Vec<f64>,
    /// Cumulative `score >= t` cut-offs.
    pub thresholds: Vec<f64>,
    /// Tickers with fewer entries are left out of the ticker ranking.
    pub min_ticker_entries: usize,
    /// Rows per ticker table on the console and in Markdown.
    pub console_top: usize,
    /// Rows per ticker list in the JSON report.
    pub saved_top: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            bucket_edges: vec![0.0, 30.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0],
            thresholds: vec![0.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0],
            min_ticker_entries: 3,
            console_top: 10,
            saved_top: 20,
        }
    }
}

impl ReportConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bucket_edges.is_empty() {
            return Err(ConfigError::Report("bucket_edges must not be empty".into()));
        }
        if self.bucket_edges.iter().any(|e| !e.is_finite()) {
            return Err(ConfigError::Report("bucket_edges must be finite".into()));
        }
        if self.bucket_edges.windows(2).any(|w| w[0] >= w[1]) {
            return Err(ConfigError::Report(
                "bucket_edges must be strictly ascending".into(),
            ));
        }
        if self.thresholds.iter().any(|t| !t.is_finite()) {
            return Err(ConfigError::Report("thresholds must be finite".into()));
        }
        if self.console_top > self.saved_top {
            return Err(ConfigError::Report(format!(
                "console_top ({}) must not exceed saved_top ({})",
                self.console_top, self.saved_top
            )));
        }
        Ok(())
    }
}

/// Where trail data comes from and how fast it is fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub api_base: String,
    /// Maximum trail records requested per instrument.
    pub limit: usize,
    /// Pause after this many processed instruments (0 disables pacing).
    pub pace_every: usize,
    pub pace_ms: u64,
    /// Fixed instrument list; bypasses the universe endpoint.
    pub tickers: Option<Vec<String>>,
    /// Use the deterministic synthetic generator instead of the service.
    pub synthetic: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            limit: 20_000,
            pace_every: 5,
            pace_ms: 100,
            tickers: None,
            synthetic: false,
        }
    }
}

/// Report file locations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub json: PathBuf,
    pub md: PathBuf,
    pub entries_csv: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            json: PathBuf::from("docs/BACKTEST_RESULTS.json"),
            md: PathBuf::from("docs/BACKTEST_RESULTS.md"),
            entries_csv: None,
        }
    }
}
