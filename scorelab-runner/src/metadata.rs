//! Run metadata recorded at the top of every report.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use scorelab_core::data::DataSource;
use scorelab_core::domain::TimeWindow;
use scorelab_core::{BacktestParams, ExcursionLevels};

use crate::loader::{LoadedEntries, SkipCounts};
use crate::reporting::number::whole;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Period {
    pub since: String,
    pub until: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunMetadata {
    pub run_date: String,
    pub period: Period,
    #[serde(serialize_with = "whole")]
    pub score_threshold: f64,
    pub hold_bars: usize,
    #[serde(serialize_with = "whole")]
    pub hold_hours: f64,
    pub tickers_fetched: usize,
    pub tickers_skipped: usize,
    pub tickers_attempted: usize,
    pub skip_reasons: SkipCounts,
    pub data_source: DataSource,
    pub params_fingerprint: String,
    pub levels: ExcursionLevels,
}

impl RunMetadata {
    pub fn new(
        run_date: DateTime<Utc>,
        window: TimeWindow,
        params: &BacktestParams,
        loaded: &LoadedEntries,
        data_source: DataSource,
    ) -> Self {
        Self {
            run_date: run_date.to_rfc3339_opts(SecondsFormat::Millis, true),
            period: Period {
                since: iso_millis(window.since_ms),
                until: iso_millis(window.until_ms),
            },
            score_threshold: params.score_threshold,
            hold_bars: params.hold_bars,
            hold_hours: params.hold_hours(),
            tickers_fetched: loaded.fetched,
            tickers_skipped: loaded.skipped.total(),
            tickers_attempted: loaded.attempted,
            skip_reasons: loaded.skipped,
            data_source,
            params_fingerprint: params.fingerprint(),
            levels: params.levels,
        }
    }
}

/// ISO-8601 UTC timestamp with millisecond precision.
pub fn iso_millis(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Millis, true))
        .unwrap_or_else(|| ms.to_string())
}

/// Calendar day (`YYYY-MM-DD`) of an epoch-millisecond timestamp.
pub fn iso_day(ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ms.to_string())
}
