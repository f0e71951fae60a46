//! TrailPoint — one timestamped snapshot of an instrument's upstream scoring state.

use serde::{Deserialize, Serialize};

/// Upstream boolean flags attached to a trail point.
///
/// The upstream service sends these as a sparse JSON object. Every known key
/// maps to a named field; absent keys read as `false` and unknown keys are
/// ignored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignalFlags {
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub sq30_release: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub sq30_on: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub momentum_elite: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub thesis_match: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub flip_watch: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub st_flip_1h: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub ema_cross_1h_13_48: bool,
    #[serde(deserialize_with = "super::lenient::truthy")]
    pub htf_improving_4h: bool,
}

/// One observation of an instrument at `ts`.
///
/// Numeric fields the upstream omitted or sent malformed are NaN, so callers
/// only ever need an `is_finite()` check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrailPoint {
    pub ticker: String,
    /// Epoch milliseconds.
    pub ts: i64,
    pub price: f64,
    pub rank: f64,
    pub htf_score: f64,
    pub ltf_score: f64,
    pub state: String,
    pub completion: f64,
    pub phase_pct: f64,
    pub flags: SignalFlags,
}

impl TrailPoint {
    /// A point usable as an entry or forward sample: finite, positive price.
    pub fn has_valid_price(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_default_to_false_and_ignore_unknown_keys() {
        let flags: SignalFlags =
            serde_json::from_str(r#"{"sq30_on": true, "some_new_flag": true}"#).unwrap();
        assert!(flags.sq30_on);
        assert!(!flags.sq30_release);
        assert!(!flags.momentum_elite);
    }

    #[test]
    fn flags_accept_truthy_non_bool_values() {
        let flags: SignalFlags = serde_json::from_str(
            r#"{"thesis_match": 1, "flip_watch": "yes", "st_flip_1h": 0, "htf_improving_4h": null}"#,
        )
        .unwrap();
        assert!(flags.thesis_match);
        assert!(flags.flip_watch);
        assert!(!flags.st_flip_1h);
        assert!(!flags.htf_improving_4h);
    }

    #[test]
    fn valid_price_rejects_zero_negative_and_nan() {
        let mut p = TrailPoint {
            ticker: "SPY".into(),
            ts: 0,
            price: 100.0,
            rank: 50.0,
            htf_score: 1.0,
            ltf_score: 1.0,
            state: "HTF_BULL_LTF_BULL".into(),
            completion: 0.2,
            phase_pct: 0.1,
            flags: SignalFlags::default(),
        };
        assert!(p.has_valid_price());
        p.price = 0.0;
        assert!(!p.has_valid_price());
        p.price = -1.0;
        assert!(!p.has_valid_price());
        p.price = f64::NAN;
        assert!(!p.has_valid_price());
    }
}
