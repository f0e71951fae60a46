//! Entry detection — classifies a single trail point as a potential simulated entry.
//!
//! The detector is stateless: it sees one point at a time and never looks at
//! its neighbours. Entry spacing and forward outcomes are the scanner's job.

use crate::domain::{Direction, EntrySignal, Signal, SignalSet, TrailPoint};
use crate::params::BacktestParams;

const ALIGNED_STATES: [&str; 2] = ["HTF_BULL_LTF_BULL", "HTF_BEAR_LTF_BEAR"];
const CORRIDOR_MAX_COMPLETION: f64 = 0.6;
const CORRIDOR_MAX_PHASE: f64 = 0.5;

/// Score-gated entry detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntryDetector {
    threshold: f64,
}

impl EntryDetector {
    pub fn new(params: &BacktestParams) -> Self {
        Self::with_threshold(params.score_threshold)
    }

    pub fn with_threshold(threshold: f64) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Classify one point.
    ///
    /// Returns `None` when the point cannot be an entry at all: non-finite
    /// `rank` or `htf_score`, invalid price, or a state without direction.
    /// Sub-threshold points still come back with `should_enter == false`.
    pub fn detect(&self, point: &TrailPoint) -> Option<EntrySignal> {
        if !point.rank.is_finite() || !point.htf_score.is_finite() {
            return None;
        }
        if !point.has_valid_price() {
            return None;
        }
        let direction = direction_from_state(&point.state)?;
        let score = point.rank;

        Some(EntrySignal {
            should_enter: score >= self.threshold,
            direction,
            score,
            signals: extract_signals(point),
            completion: finite(point.completion),
            phase: finite(point.phase_pct),
        })
    }
}

/// `HTF_BULL*` is long, `HTF_BEAR*` is short, anything else has no direction.
pub fn direction_from_state(state: &str) -> Option<Direction> {
    if state.starts_with("HTF_BULL") {
        Some(Direction::Long)
    } else if state.starts_with("HTF_BEAR") {
        Some(Direction::Short)
    } else {
        None
    }
}

/// Collect the active signal vocabulary for a point.
pub fn extract_signals(point: &TrailPoint) -> SignalSet {
    let flags = &point.flags;
    let state = point.state.as_str();
    let mut set = SignalSet::new();

    if state.contains("PULLBACK") {
        set.insert(Signal::LtfPullback);
    }
    if flags.sq30_release {
        set.insert(Signal::Sq30Release);
    }
    // Release supersedes the squeeze itself.
    if flags.sq30_on && !flags.sq30_release {
        set.insert(Signal::Sq30On);
    }
    if flags.momentum_elite {
        set.insert(Signal::MomentumElite);
    }
    if flags.thesis_match {
        set.insert(Signal::ThesisMatch);
    }
    if flags.flip_watch {
        set.insert(Signal::FlipWatch);
    }
    if flags.st_flip_1h {
        set.insert(Signal::StFlip1h);
    }
    if flags.ema_cross_1h_13_48 {
        set.insert(Signal::EmaCross1h);
    }
    if flags.htf_improving_4h {
        set.insert(Signal::HtfImproving);
    }
    if ALIGNED_STATES.contains(&state) {
        set.insert(Signal::Aligned);
    }
    if in_corridor(point.completion, point.phase_pct) {
        set.insert(Signal::InCorridor);
    }
    set
}

fn in_corridor(completion: f64, phase: f64) -> bool {
    completion.is_finite()
        && completion < CORRIDOR_MAX_COMPLETION
        && phase.is_finite()
        && phase < CORRIDOR_MAX_PHASE
}

fn finite(x: f64) -> Option<f64> {
    x.is_finite().then_some(x)
}
