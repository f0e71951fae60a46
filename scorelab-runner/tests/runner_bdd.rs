//! BDD tests for the backtest runner.
//!
//! These tests verify the run pipeline end to end against an in-memory provider:
//! - Skip accounting (fetched + skipped = attempted)
//! - Insufficient history
//! - Zero entries
//! - Fatal universe failure and the ticker override

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use scorelab_core::data::{DataError, DataSource, RawTrailPoint, TrailProvider};
use scorelab_core::domain::{Direction, SignalFlags, TimeWindow, MS_PER_DAY, MS_PER_MINUTE};
use scorelab_runner::{run_backtest, BacktestConfig, LoadProgress, RunError};

const BAR: i64 = 5 * MS_PER_MINUTE;

enum MockTrail {
    Points(Vec<RawTrailPoint>),
    Fail,
}

struct MockProvider {
    universe: Option<Vec<String>>,
    trails: HashMap<String, MockTrail>,
    calls: AtomicUsize,
}

impl MockProvider {
    fn new(universe: &[&str]) -> Self {
        Self {
            universe: Some(universe.iter().map(|s| s.to_string()).collect()),
            trails: HashMap::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn with_trail(mut self, ticker: &str, trail: MockTrail) -> Self {
        self.trails.insert(ticker.to_string(), trail);
        self
    }
}

impl TrailProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch_universe(&self) -> Result<Vec<String>, DataError> {
        self.universe
            .clone()
            .ok_or_else(|| DataError::NetworkUnreachable("universe offline".into()))
    }

    fn fetch_trail(
        &self,
        ticker: &str,
        _since_ms: i64,
        _limit: usize,
    ) -> Result<Vec<RawTrailPoint>, DataError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.trails.get(ticker) {
            Some(MockTrail::Points(points)) => Ok(points.clone()),
            Some(MockTrail::Fail) => Err(DataError::HttpStatus {
                status: 500,
                url: format!("mock://{ticker}"),
            }),
            None => Ok(Vec::new()),
        }
    }
}

fn point(i: i64, price: f64, rank: f64, state: &str) -> RawTrailPoint {
    RawTrailPoint {
        ts: Some(i * BAR),
        price,
        rank,
        htf_score: 1.0,
        ltf_score: 0.0,
        state: state.into(),
        completion: 0.3,
        phase_pct: 0.2,
        flags: SignalFlags::default(),
    }
}

fn rising(n: i64, rank: f64) -> MockTrail {
    MockTrail::Points(
        (0..n)
            .map(|i| point(i, 100.0 + i as f64 * 0.2, rank, "HTF_BULL_LTF_BULL"))
            .collect(),
    )
}

fn rally_seen_short(n: i64, rank: f64) -> MockTrail {
    MockTrail::Points(
        (0..n)
            .map(|i| point(i, 100.0 + i as f64 * 0.4, rank, "HTF_BEAR_LTF_BEAR"))
            .collect(),
    )
}

fn quick_config() -> BacktestConfig {
    let mut cfg = BacktestConfig::default();
    cfg.params.hold_bars = 6;
    cfg.source.pace_ms = 0;
    cfg
}

fn window() -> TimeWindow {
    TimeWindow::new(0, MS_PER_DAY)
}

#[test]
fn bdd_scenario_skip_accounting_balances() {
    // GIVEN a universe with one good ticker, one thin ticker, one failing ticker
    // AND one ticker whose history falls mostly outside the window
    let late: Vec<RawTrailPoint> = (0..20)
        .map(|i| point(i + 280, 100.0, 80.0, "HTF_BULL_LTF_BULL"))
        .collect();
    let provider = MockProvider::new(&["GOOD", "THIN", "FAIL", "LATE"])
        .with_trail("GOOD", rising(60, 80.0))
        .with_trail("THIN", rising(5, 80.0))
        .with_trail("FAIL", MockTrail::Fail)
        .with_trail("LATE", MockTrail::Points(late));

    // WHEN the backtest runs
    let run = run_backtest(&quick_config(), &provider, window(), None, false).unwrap();

    // THEN every attempted ticker is either fetched or skipped
    assert_eq!(run.attempted, 4);
    assert_eq!(run.fetched + run.skipped, run.attempted);
    assert_eq!(run.fetched, 1);
    assert_eq!(provider.calls.load(Ordering::SeqCst), 4);

    // AND the skip breakdown names each reason
    let report = run.report.expect("GOOD produces entries");
    let reasons = &report.metadata.skip_reasons;
    assert_eq!(reasons.insufficient_raw_history, 1);
    assert_eq!(reasons.insufficient_window_history, 1);
    assert_eq!(reasons.fetch_failed, 1);
    assert_eq!(report.metadata.data_source, DataSource::Synthetic);
}

#[test]
fn bdd_scenario_insufficient_history_is_skipped() {
    // GIVEN a single ticker with only 5 trail points
    let provider = MockProvider::new(&["TINY"]).with_trail("TINY", rising(5, 90.0));

    // WHEN the backtest runs
    let run = run_backtest(&quick_config(), &provider, window(), None, false).unwrap();

    // THEN the ticker is skipped and no entries or report exist
    assert_eq!(run.fetched, 0);
    assert_eq!(run.skipped, 1);
    assert!(run.entries.is_empty());
    assert!(run.report.is_none());
}

#[test]
fn bdd_scenario_zero_entries_is_not_an_error() {
    // GIVEN plenty of history but a threshold no point can reach
    let provider = MockProvider::new(&["AAA", "BBB"])
        .with_trail("AAA", rising(60, 70.0))
        .with_trail("BBB", rising(60, 80.0));
    let mut cfg = quick_config();
    cfg.params.score_threshold = 101.0;

    // WHEN the backtest runs
    let run = run_backtest(&cfg, &provider, window(), None, false).unwrap();

    // THEN the run succeeds with both tickers fetched and nothing to report
    assert_eq!(run.fetched, 2);
    assert!(run.entries.is_empty());
    assert!(run.report.is_none());
}

#[test]
fn bdd_scenario_long_wins_and_short_losses_on_a_rally() {
    // GIVEN a rally seen by one bullish and one bearish ticker
    let provider = MockProvider::new(&["BULL", "BEAR"])
        .with_trail("BULL", rising(60, 80.0))
        .with_trail("BEAR", rally_seen_short(60, 80.0));

    // WHEN the backtest runs
    let run = run_backtest(&quick_config(), &provider, window(), None, false).unwrap();
    let report = run.report.unwrap();

    // THEN longs win, shorts lose, and the direction view agrees
    for e in &run.entries {
        match e.direction {
            Direction::Long => assert!(e.outcome.is_win),
            Direction::Short => assert!(e.outcome.is_loss),
        }
    }
    let long = &report.direction_analysis[0];
    let short = &report.direction_analysis[1];
    assert_eq!(long.win_rate, 1.0);
    assert_eq!(short.win_rate, 0.0);
    assert_eq!(report.overall.total_entries, run.entries.len());

    // AND the ticker ranking puts the winner first and the loser first from the bottom
    assert_eq!(report.top_tickers[0].ticker, "BULL");
    assert_eq!(report.bottom_tickers[0].ticker, "BEAR");
}

#[test]
fn bdd_scenario_entries_are_spaced_thirty_minutes_apart() {
    // GIVEN a long trail where every point qualifies
    let provider = MockProvider::new(&["SPY"]).with_trail("SPY", rising(100, 90.0));

    // WHEN the backtest runs
    let run = run_backtest(&quick_config(), &provider, window(), None, false).unwrap();

    // THEN consecutive entries are exactly six bars apart
    assert!(run.entries.len() > 2);
    for pair in run.entries.windows(2) {
        assert_eq!(pair[1].ts - pair[0].ts, 30 * MS_PER_MINUTE);
    }
}

#[test]
fn bdd_scenario_universe_failure_is_fatal() {
    // GIVEN a provider whose universe endpoint is down
    let mut provider = MockProvider::new(&[]);
    provider.universe = None;

    // WHEN the backtest runs
    let result = run_backtest(&quick_config(), &provider, window(), None, false);

    // THEN the run aborts with a universe error
    assert!(matches!(result, Err(RunError::Universe(_))));
}

#[test]
fn bdd_scenario_ticker_override_bypasses_universe() {
    // GIVEN a broken universe endpoint but an explicit ticker list
    let mut provider = MockProvider::new(&[]).with_trail("QQQ", rising(60, 80.0));
    provider.universe = None;
    let mut cfg = quick_config();
    cfg.source.tickers = Some(vec!["QQQ".into()]);

    // WHEN the backtest runs
    let run = run_backtest(&cfg, &provider, window(), None, false).unwrap();

    // THEN only the listed ticker is fetched
    assert_eq!(run.attempted, 1);
    assert_eq!(run.fetched, 1);
    assert!(run.report.is_some());
}

#[test]
fn bdd_scenario_invalid_config_is_rejected_before_fetching() {
    // GIVEN a config with a zero hold window
    let provider = MockProvider::new(&["SPY"]).with_trail("SPY", rising(60, 80.0));
    let mut cfg = quick_config();
    cfg.params.hold_bars = 0;

    // WHEN the backtest runs
    let result = run_backtest(&cfg, &provider, window(), None, false);

    // THEN it fails with a config error and never touches the provider
    assert!(matches!(result, Err(RunError::Config(_))));
    assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
}

struct CountingProgress {
    universe: Cell<usize>,
    ticks: Cell<usize>,
}

impl LoadProgress for CountingProgress {
    fn on_universe(&self, total: usize) {
        self.universe.set(total);
    }

    fn on_instrument(&self, _fetched: usize, _total: usize, _entries_so_far: usize) {
        self.ticks.set(self.ticks.get() + 1);
    }
}

#[test]
fn bdd_scenario_progress_sees_each_processed_ticker() {
    // GIVEN three tickers, one of which fails
    let provider = MockProvider::new(&["A", "B", "C"])
        .with_trail("A", rising(60, 80.0))
        .with_trail("B", MockTrail::Fail)
        .with_trail("C", rising(60, 80.0));
    let progress = CountingProgress {
        universe: Cell::new(0),
        ticks: Cell::new(0),
    };

    // WHEN the backtest runs with a progress observer
    run_backtest(&quick_config(), &provider, window(), Some(&progress), false).unwrap();

    // THEN it is told the universe size and ticked once per processed ticker
    assert_eq!(progress.universe.get(), 3);
    assert_eq!(progress.ticks.get(), 2);
}
