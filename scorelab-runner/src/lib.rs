//! ScoreLab Runner — backtest orchestration, aggregation, reports.
//!
//! This crate builds on `scorelab-core` to provide:
//! - TOML configuration with defaults and window resolution
//! - Sequential trail loading with pacing and skip accounting
//! - Six-view report aggregation
//! - Console, Markdown, JSON and CSV output

pub mod aggregate;
pub mod config;
pub mod loader;
pub mod metadata;
pub mod reporting;
pub mod runner;

pub use aggregate::{build_report, BacktestReport};
pub use config::{BacktestConfig, ConfigError, OutputConfig, ReportConfig, SourceConfig, WindowConfig};
pub use loader::{
    load_entries, load_entries_paced, LoadOptions, LoadProgress, LoadedEntries, SkipCounts,
    StdoutProgress,
};
pub use metadata::RunMetadata;
pub use runner::{run_backtest, BacktestRun, RunError};
