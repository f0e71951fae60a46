//! Backtest runner — wires together universe, loader, scanner and aggregation.
//!
//! `run_backtest()` is the single entry point used by the CLI. It never
//! writes files; exporting the returned report is the caller's job.

use std::time::Duration;

use chrono::Utc;
use thiserror::Error;
use tracing::info;

use scorelab_core::data::{DataError, TrailProvider};
use scorelab_core::domain::{SimulatedEntry, TimeWindow};
use scorelab_core::TrailScanner;

use crate::aggregate::{build_report, BacktestReport};
use crate::config::{BacktestConfig, ConfigError};
use crate::loader::{load_entries, LoadOptions, LoadProgress, LoadedEntries};
use crate::metadata::RunMetadata;

/// Fatal errors from the runner. Per-instrument failures never surface here.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("failed to fetch ticker universe: {0}")]
    Universe(#[source] DataError),
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct BacktestRun {
    /// `None` when no entries were found; nothing should be written then.
    pub report: Option<BacktestReport>,
    pub entries: Vec<SimulatedEntry>,
    pub attempted: usize,
    pub fetched: usize,
    pub skipped: usize,
}

/// Run the scoring backtest over `window`.
pub fn run_backtest(
    config: &BacktestConfig,
    provider: &dyn TrailProvider,
    window: TimeWindow,
    progress: Option<&dyn LoadProgress>,
    verbose: bool,
) -> Result<BacktestRun, RunError> {
    config.validate()?;

    let tickers = match &config.source.tickers {
        Some(list) => list.clone(),
        None => provider.fetch_universe().map_err(RunError::Universe)?,
    };
    info!(
        provider = provider.name(),
        tickers = tickers.len(),
        since = window.since_ms,
        until = window.until_ms,
        "starting backtest"
    );

    let params = &config.params;
    let scanner = TrailScanner::new(params);
    let opts = LoadOptions {
        window,
        limit: config.source.limit,
        min_points: params.min_trail_points,
        pace_every: config.source.pace_every,
        pace: Duration::from_millis(config.source.pace_ms),
        verbose,
    };

    let loaded = load_entries(provider, &tickers, &scanner, &opts, progress);
    info!(
        fetched = loaded.fetched,
        skipped = loaded.skipped.total(),
        entries = loaded.entries.len(),
        "trail scan complete"
    );

    let report = (!loaded.entries.is_empty()).then(|| {
        let metadata = RunMetadata::new(Utc::now(), window, params, &loaded, provider.source());
        build_report(&loaded.entries, metadata, &config.report)
    });

    let LoadedEntries {
        entries,
        attempted,
        fetched,
        skipped,
    } = loaded;

    Ok(BacktestRun {
        report,
        entries,
        attempted,
        fetched,
        skipped: skipped.total(),
    })
}
