//! Simulated entries: direction, signal vocabulary, forward outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Trade direction derived from the upstream higher-timeframe state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Direction {
    Long,
    Short,
}

impl Direction {
    /// Signed fractional return of moving from `entry` to `price` in this direction.
    pub fn signed_return(self, entry: f64, price: f64) -> f64 {
        match self {
            Direction::Long => (price - entry) / entry,
            Direction::Short => (entry - price) / entry,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Long => "LONG",
            Direction::Short => "SHORT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The fixed vocabulary of entry signals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Signal {
    #[serde(rename = "ltf_pullback")]
    LtfPullback,
    #[serde(rename = "sq30_release")]
    Sq30Release,
    #[serde(rename = "sq30_on")]
    Sq30On,
    #[serde(rename = "momentum_elite")]
    MomentumElite,
    #[serde(rename = "thesis_match")]
    ThesisMatch,
    #[serde(rename = "flip_watch")]
    FlipWatch,
    #[serde(rename = "st_flip_1h")]
    StFlip1h,
    #[serde(rename = "ema_cross_1h")]
    EmaCross1h,
    #[serde(rename = "htf_improving")]
    HtfImproving,
    #[serde(rename = "aligned")]
    Aligned,
    #[serde(rename = "in_corridor")]
    InCorridor,
}

impl Signal {
    /// Every signal, in report order.
    pub const ALL: [Signal; 11] = [
        Signal::LtfPullback,
        Signal::Sq30Release,
        Signal::Sq30On,
        Signal::MomentumElite,
        Signal::ThesisMatch,
        Signal::FlipWatch,
        Signal::StFlip1h,
        Signal::EmaCross1h,
        Signal::HtfImproving,
        Signal::Aligned,
        Signal::InCorridor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Signal::LtfPullback => "ltf_pullback",
            Signal::Sq30Release => "sq30_release",
            Signal::Sq30On => "sq30_on",
            Signal::MomentumElite => "momentum_elite",
            Signal::ThesisMatch => "thesis_match",
            Signal::FlipWatch => "flip_watch",
            Signal::StFlip1h => "st_flip_1h",
            Signal::EmaCross1h => "ema_cross_1h",
            Signal::HtfImproving => "htf_improving",
            Signal::Aligned => "aligned",
            Signal::InCorridor => "in_corridor",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of active signals. Serializes as a list of signal names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "Vec<Signal>", from = "Vec<Signal>")]
pub struct SignalSet(u16);

impl SignalSet {
    pub fn new() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, signal: Signal) {
        self.0 |= signal.bit();
    }

    pub fn contains(&self, signal: Signal) -> bool {
        self.0 & signal.bit() != 0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Active signals in report order.
    pub fn iter(&self) -> impl Iterator<Item = Signal> + '_ {
        Signal::ALL.into_iter().filter(move |s| self.contains(*s))
    }
}

impl From<Vec<Signal>> for SignalSet {
    fn from(signals: Vec<Signal>) -> Self {
        signals.into_iter().collect()
    }
}

impl From<SignalSet> for Vec<Signal> {
    fn from(set: SignalSet) -> Self {
        set.iter().collect()
    }
}

impl FromIterator<Signal> for SignalSet {
    fn from_iter<I: IntoIterator<Item = Signal>>(iter: I) -> Self {
        let mut set = SignalSet::new();
        for s in iter {
            set.insert(s);
        }
        set
    }
}

/// What the detector saw at a single trail point.
#[derive(Debug, Clone, PartialEq)]
pub struct EntrySignal {
    /// Score cleared the configured threshold.
    pub should_enter: bool,
    pub direction: Direction,
    pub score: f64,
    pub signals: SignalSet,
    pub completion: Option<f64>,
    pub phase: Option<f64>,
}

/// Forward outcome of a position opened at one trail point.
///
/// `mfe` and `mae` are direction-adjusted fractions: `mfe >= 0`, `mae <= 0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outcome {
    pub entry_price: f64,
    pub exit_price: f64,
    pub entry_ts: i64,
    pub exit_ts: i64,
    pub final_pnl_pct: f64,
    pub mfe: f64,
    pub mae: f64,
    pub mfe_ts: i64,
    pub mae_ts: i64,
    #[serde(rename = "hitTP1")]
    pub hit_tp1: bool,
    #[serde(rename = "hitTP2")]
    pub hit_tp2: bool,
    #[serde(rename = "hitXP")]
    pub hit_xp: bool,
    #[serde(rename = "hitSL")]
    pub hit_sl: bool,
    pub is_win: bool,
    pub is_loss: bool,
    pub hold_minutes: f64,
}

impl Outcome {
    /// Neither a win nor a loss: no threshold reached, or an exact tie.
    pub fn is_neutral(&self) -> bool {
        !self.is_win && !self.is_loss
    }
}

/// A simulated trade: one qualifying trail point plus its forward outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatedEntry {
    pub ticker: String,
    pub ts: i64,
    pub price: f64,
    pub direction: Direction,
    pub score: f64,
    pub signals: SignalSet,
    pub completion: Option<f64>,
    pub phase: Option<f64>,
    pub state: String,
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl SimulatedEntry {
    pub fn has_signal(&self, signal: Signal) -> bool {
        self.signals.contains(signal)
    }
}
