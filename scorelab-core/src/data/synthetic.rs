//! Synthetic trail provider for offline runs.
//!
//! Each ticker gets a deterministic random walk seeded from its name, with
//! regime-driven states, ranks and flags shaped like the real service's. This
//! is a developer mode: reports record the source as `synthetic`.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataSource, TrailProvider};
use super::wire::RawTrailPoint;
use crate::domain::{SignalFlags, MS_PER_MINUTE};

/// Default synthetic universe.
pub const DEFAULT_SYNTHETIC_UNIVERSE: [&str; 8] =
    ["SPY", "QQQ", "IWM", "AAPL", "MSFT", "NVDA", "AMZN", "TSLA"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Regime {
    Bull,
    Bear,
    Neutral,
}

impl Regime {
    fn pick(rng: &mut StdRng) -> Self {
        match rng.gen_range(0..5) {
            0 | 1 => Regime::Bull,
            2 | 3 => Regime::Bear,
            _ => Regime::Neutral,
        }
    }

    fn drift(self) -> f64 {
        match self {
            Regime::Bull => 0.0004,
            Regime::Bear => -0.0004,
            Regime::Neutral => 0.0,
        }
    }

    fn state(self, rng: &mut StdRng) -> &'static str {
        let pullback = rng.gen_bool(0.25);
        match (self, pullback) {
            (Regime::Bull, false) => "HTF_BULL_LTF_BULL",
            (Regime::Bull, true) => "HTF_BULL_LTF_PULLBACK",
            (Regime::Bear, false) => "HTF_BEAR_LTF_BEAR",
            (Regime::Bear, true) => "HTF_BEAR_LTF_PULLBACK",
            (Regime::Neutral, _) => "NEUTRAL",
        }
    }
}

/// Deterministic synthetic trail source.
#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    universe: Vec<String>,
    until_ms: i64,
    bar_ms: i64,
}

impl SyntheticProvider {
    /// Trails run on a `bar_minutes` grid up to `until_ms`.
    pub fn new(universe: Vec<String>, until_ms: i64, bar_minutes: u32) -> Self {
        Self {
            universe,
            until_ms,
            bar_ms: i64::from(bar_minutes.max(1)) * MS_PER_MINUTE,
        }
    }

    pub fn with_default_universe(until_ms: i64, bar_minutes: u32) -> Self {
        let universe = DEFAULT_SYNTHETIC_UNIVERSE
            .iter()
            .map(|s| s.to_string())
            .collect();
        Self::new(universe, until_ms, bar_minutes)
    }

    fn generate(&self, ticker: &str, since_ms: i64, limit: usize) -> Vec<RawTrailPoint> {
        // Deterministic seed from ticker name
        let seed: [u8; 32] = *blake3::hash(ticker.as_bytes()).as_bytes();
        let mut rng = StdRng::from_seed(seed);

        let mut price: f64 = rng.gen_range(20.0..400.0);
        let mut regime = Regime::pick(&mut rng);
        let mut regime_left: u32 = rng.gen_range(12..120);

        let mut ts = since_ms - since_ms.rem_euclid(self.bar_ms);
        if ts < since_ms {
            ts += self.bar_ms;
        }

        let mut trail = Vec::new();
        while ts <= self.until_ms && trail.len() < limit {
            if regime_left == 0 {
                regime = Regime::pick(&mut rng);
                regime_left = rng.gen_range(12..120);
            }
            regime_left -= 1;

            let ret = regime.drift() + rng.gen_range(-0.004..0.004);
            price = (price * (1.0 + ret)).max(0.01);

            let conviction: f64 = match regime {
                Regime::Neutral => 0.2,
                _ => 0.6,
            };
            let rank = (conviction * 100.0 + rng.gen_range(-40.0..40.0)).clamp(0.0, 100.0);
            let htf_sign = match regime {
                Regime::Bull => 1.0,
                Regime::Bear => -1.0,
                Regime::Neutral => 0.0,
            };

            trail.push(RawTrailPoint {
                ts: Some(ts),
                price,
                rank: rank.round(),
                htf_score: htf_sign * rng.gen_range(0.0..2.0),
                ltf_score: rng.gen_range(-1.0..1.0),
                state: regime.state(&mut rng).to_string(),
                completion: rng.gen_range(0.0..1.0),
                phase_pct: rng.gen_range(0.0..1.0),
                flags: random_flags(&mut rng),
            });

            ts += self.bar_ms;
        }
        trail
    }
}

fn random_flags(rng: &mut StdRng) -> SignalFlags {
    let sq30_on = rng.gen_bool(0.2);
    SignalFlags {
        sq30_release: sq30_on && rng.gen_bool(0.3),
        sq30_on,
        momentum_elite: rng.gen_bool(0.1),
        thesis_match: rng.gen_bool(0.15),
        flip_watch: rng.gen_bool(0.05),
        st_flip_1h: rng.gen_bool(0.05),
        ema_cross_1h_13_48: rng.gen_bool(0.04),
        htf_improving_4h: rng.gen_bool(0.2),
    }
}

impl TrailProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch_universe(&self) -> Result<Vec<String>, DataError> {
        Ok(self.universe.clone())
    }

    fn fetch_trail(
        &self,
        ticker: &str,
        since_ms: i64,
        limit: usize,
    ) -> Result<Vec<RawTrailPoint>, DataError> {
        Ok(self.generate(ticker, since_ms, limit))
    }
}
