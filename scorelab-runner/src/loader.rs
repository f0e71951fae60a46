//! Sequential trail loading and scanning.
//!
//! One instrument at a time: fetch, prepare, scan, collect entries. A failed
//! or thin instrument is skipped and counted; it never aborts the run. After
//! every `pace_every` processed instruments the loop sleeps for `pace`.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use scorelab_core::data::{prepare_trail, HistoryShortfall, TrailProvider};
use scorelab_core::domain::{SimulatedEntry, TimeWindow};
use scorelab_core::TrailScanner;

/// Options controlling how trails are fetched.
#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub window: TimeWindow,
    /// Maximum records requested per instrument.
    pub limit: usize,
    /// Minimum trail length, checked before and after window filtering.
    pub min_points: usize,
    /// Pause after this many processed instruments (0 disables pacing).
    pub pace_every: usize,
    pub pace: Duration,
    /// Per-instrument failures at warn level instead of debug.
    pub verbose: bool,
}

/// Why an instrument was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    InsufficientRawHistory,
    InsufficientWindowHistory,
    FetchFailed,
}

impl From<HistoryShortfall> for SkipReason {
    fn from(s: HistoryShortfall) -> Self {
        match s {
            HistoryShortfall::Raw { .. } => SkipReason::InsufficientRawHistory,
            HistoryShortfall::Window { .. } => SkipReason::InsufficientWindowHistory,
        }
    }
}

/// Skipped instruments broken down by reason.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkipCounts {
    pub insufficient_raw_history: usize,
    pub insufficient_window_history: usize,
    pub fetch_failed: usize,
}

impl SkipCounts {
    pub fn record(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::InsufficientRawHistory => self.insufficient_raw_history += 1,
            SkipReason::InsufficientWindowHistory => self.insufficient_window_history += 1,
            SkipReason::FetchFailed => self.fetch_failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.insufficient_raw_history + self.insufficient_window_history + self.fetch_failed
    }
}

/// Everything the loop produced.
#[derive(Debug, Clone, Default)]
pub struct LoadedEntries {
    pub entries: Vec<SimulatedEntry>,
    pub attempted: usize,
    pub fetched: usize,
    pub skipped: SkipCounts,
}

/// Progress callback for the load loop.
pub trait LoadProgress {
    /// Called once with the size of the instrument list.
    fn on_universe(&self, total: usize);

    /// Called after each successfully processed instrument.
    fn on_instrument(&self, fetched: usize, total: usize, entries_so_far: usize);
}

/// Progress reporter that prints to stdout.
pub struct StdoutProgress {
    /// Print a progress line every this many processed instruments.
    pub every: usize,
}

impl Default for StdoutProgress {
    fn default() -> Self {
        Self { every: 20 }
    }
}

impl LoadProgress for StdoutProgress {
    fn on_universe(&self, total: usize) {
        println!("\nLoaded {total} tickers. Fetching trail data...");
    }

    fn on_instrument(&self, fetched: usize, total: usize, entries_so_far: usize) {
        if self.every > 0 && fetched % self.every == 0 {
            println!("  {fetched}/{total} tickers, {entries_so_far} entries so far");
        }
    }
}

/// Fetch, prepare and scan every ticker in order, sleeping between batches.
pub fn load_entries(
    provider: &dyn TrailProvider,
    tickers: &[String],
    scanner: &TrailScanner,
    opts: &LoadOptions,
    progress: Option<&dyn LoadProgress>,
) -> LoadedEntries {
    load_entries_paced(provider, tickers, scanner, opts, progress, std::thread::sleep)
}

/// `load_entries` with the pacing pause supplied by the caller.
///
/// `pause` runs after every `pace_every`-th successfully processed instrument.
/// Skipped instruments do not count.
pub fn load_entries_paced(
    provider: &dyn TrailProvider,
    tickers: &[String],
    scanner: &TrailScanner,
    opts: &LoadOptions,
    progress: Option<&dyn LoadProgress>,
    mut pause: impl FnMut(Duration),
) -> LoadedEntries {
    let total = tickers.len();
    if let Some(p) = progress {
        p.on_universe(total);
    }

    let mut out = LoadedEntries {
        attempted: total,
        ..Default::default()
    };

    for ticker in tickers {
        let raw = match provider.fetch_trail(ticker, opts.window.since_ms, opts.limit) {
            Ok(raw) => raw,
            Err(e) => {
                if opts.verbose {
                    warn!(ticker = %ticker, error = %e, "trail fetch failed");
                } else {
                    debug!(ticker = %ticker, error = %e, "trail fetch failed");
                }
                out.skipped.record(SkipReason::FetchFailed);
                continue;
            }
        };

        let trail = match prepare_trail(ticker, raw, opts.window, opts.min_points) {
            Ok(trail) => trail,
            Err(shortfall) => {
                debug!(ticker = %ticker, %shortfall, "skipping instrument");
                out.skipped.record(shortfall.into());
                continue;
            }
        };

        let entries = scanner.scan(ticker, &trail);
        debug!(ticker = %ticker, points = trail.len(), entries = entries.len(), "scanned");
        out.entries.extend(entries);
        out.fetched += 1;

        if let Some(p) = progress {
            p.on_instrument(out.fetched, total, out.entries.len());
        }

        if opts.pace_every > 0 && out.fetched % opts.pace_every == 0 && !opts.pace.is_zero() {
            pause(opts.pace);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use scorelab_core::data::{DataError, DataSource, RawTrailPoint};
    use scorelab_core::domain::{SignalFlags, MS_PER_MINUTE};
    use scorelab_core::BacktestParams;

    use super::*;

    /// Records fetches and pauses in one ordered log.
    struct LoggingProvider<'a> {
        log: &'a Mutex<Vec<String>>,
    }

    impl TrailProvider for LoggingProvider<'_> {
        fn name(&self) -> &str {
            "logging"
        }

        fn source(&self) -> DataSource {
            DataSource::Synthetic
        }

        fn fetch_universe(&self) -> Result<Vec<String>, DataError> {
            Ok(Vec::new())
        }

        fn fetch_trail(
            &self,
            ticker: &str,
            _since_ms: i64,
            _limit: usize,
        ) -> Result<Vec<RawTrailPoint>, DataError> {
            self.log.lock().unwrap().push(ticker.to_string());
            if ticker.starts_with("BAD") {
                return Err(DataError::Other("boom".into()));
            }
            Ok((0..12)
                .map(|i| RawTrailPoint {
                    ts: Some(i * 5 * MS_PER_MINUTE),
                    price: 100.0,
                    rank: 10.0,
                    htf_score: 1.0,
                    ltf_score: 0.0,
                    state: "HTF_BULL_LTF_BULL".into(),
                    completion: 0.5,
                    phase_pct: 0.5,
                    flags: SignalFlags::default(),
                })
                .collect())
        }
    }

    fn opts(pace_every: usize) -> LoadOptions {
        LoadOptions {
            window: TimeWindow::new(0, 24 * 60 * MS_PER_MINUTE),
            limit: 100,
            min_points: 10,
            pace_every,
            pace: Duration::from_millis(100),
            verbose: false,
        }
    }

    fn paced_log(tickers: &[&str], pace_every: usize) -> (Vec<String>, LoadedEntries) {
        let log = Mutex::new(Vec::new());
        let provider = LoggingProvider { log: &log };
        let tickers: Vec<String> = tickers.iter().map(|t| t.to_string()).collect();
        let scanner = TrailScanner::new(&BacktestParams::default());
        let loaded = load_entries_paced(
            &provider,
            &tickers,
            &scanner,
            &opts(pace_every),
            None,
            |d| {
                assert_eq!(d, Duration::from_millis(100));
                log.lock().unwrap().push("pause".into());
            },
        );
        (log.into_inner().unwrap(), loaded)
    }

    #[test]
    fn pauses_after_every_fifth_successful_instrument() {
        let tickers = [
            "A1", "A2", "BAD1", "A3", "A4", "A5", "BAD2", "A6", "A7", "A8", "A9", "A10", "BAD3",
        ];
        let (log, loaded) = paced_log(&tickers, 5);

        assert_eq!(loaded.fetched, 10);
        assert_eq!(loaded.skipped.fetch_failed, 3);
        let pauses: Vec<usize> = log
            .iter()
            .enumerate()
            .filter(|(_, e)| *e == "pause")
            .map(|(i, _)| i)
            .collect();
        assert_eq!(pauses.len(), 2);
        assert_eq!(log[pauses[0] - 1], "A5");
        assert_eq!(log[pauses[1] - 1], "A10");
        assert_eq!(log.last().map(String::as_str), Some("BAD3"));
    }

    #[test]
    fn failures_alone_never_pause() {
        let (log, loaded) = paced_log(&["BAD1", "BAD2", "BAD3", "BAD4", "BAD5", "BAD6"], 5);
        assert_eq!(loaded.fetched, 0);
        assert!(!log.iter().any(|e| e == "pause"));
    }

    #[test]
    fn zero_pace_every_disables_pacing() {
        let tickers: Vec<String> = (0..12).map(|i| format!("T{i}")).collect();
        let refs: Vec<&str> = tickers.iter().map(String::as_str).collect();
        let (log, loaded) = paced_log(&refs, 0);
        assert_eq!(loaded.fetched, 12);
        assert!(!log.iter().any(|e| e == "pause"));
    }

    #[test]
    fn skip_counts_total_all_reasons() {
        let mut s = SkipCounts::default();
        s.record(SkipReason::FetchFailed);
        s.record(SkipReason::InsufficientRawHistory);
        s.record(SkipReason::InsufficientRawHistory);
        s.record(SkipReason::InsufficientWindowHistory);
        assert_eq!(s.total(), 4);
        assert_eq!(s.insufficient_raw_history, 2);
    }

    #[test]
    fn shortfall_maps_to_reason() {
        assert_eq!(
            SkipReason::from(HistoryShortfall::Raw { got: 5, need: 10 }),
            SkipReason::InsufficientRawHistory
        );
        assert_eq!(
            SkipReason::from(HistoryShortfall::Window { got: 5, need: 10 }),
            SkipReason::InsufficientWindowHistory
        );
    }
}
