//! Backtest parameters — one immutable value shared by detector, simulator and scanner.
//!
//! Every constant the scoring backtest depends on lives here instead of in
//! module-level state, so two parameter sets can run side by side in one
//! process.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parameter validation.
#[derive(Debug, Error, PartialEq)]
pub enum ParamsError {
    #[error("hold_bars must be at least 1")]
    ZeroHoldBars,
    #[error("bar_minutes must be at least 1")]
    ZeroBarMinutes,
    #[error("score_threshold must be finite, got {0}")]
    NonFiniteThreshold(f64),
    #[error("excursion level '{name}' must be finite and positive, got {value}")]
    InvalidLevel { name: &'static str, value: f64 },
    #[error("take-profit levels must be ascending: tp1 <= tp2 <= xp")]
    UnorderedTargets,
    #[error("min_entry_gap_minutes must not be negative, got {0}")]
    NegativeGap(i64),
}

/// Fixed excursion thresholds, as positive fractions of entry price.
///
/// Targets are compared against MFE, the stop against the magnitude of MAE.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExcursionLevels {
    /// First take-profit (0.618%).
    pub tp1: f64,
    /// Second take-profit (1.0%).
    pub tp2: f64,
    /// Extended target (1.618%).
    pub xp: f64,
    /// Stop-loss distance (1.5% adverse).
    pub sl: f64,
}

impl Default for ExcursionLevels {
    fn default() -> Self {
        Self {
            tp1: 0.00618,
            tp2: 0.01,
            xp: 0.01618,
            sl: 0.015,
        }
    }
}

/// Parameters for one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestParams {
    /// Minimum `rank` for a point to become a simulated entry.
    pub score_threshold: f64,
    /// Maximum forward samples examined per entry.
    pub hold_bars: usize,
    /// Nominal bar spacing of the trail, used for reporting hold hours.
    pub bar_minutes: u32,
    /// Minimum spacing between accepted entries of one instrument.
    pub min_entry_gap_minutes: i64,
    /// Instruments with fewer points than this are skipped.
    pub min_trail_points: usize,
    /// Only consider entries with a complete forward window (`i < len - hold_bars`).
    pub require_full_window: bool,
    pub levels: ExcursionLevels,
}

impl Default for BacktestParams {
    fn default() -> Self {
        Self {
            score_threshold: 0.0,
            hold_bars: 48,
            bar_minutes: 5,
            min_entry_gap_minutes: 30,
            min_trail_points: 10,
            require_full_window: true,
            levels: ExcursionLevels::default(),
        }
    }
}

impl BacktestParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.hold_bars == 0 {
            return Err(ParamsError::ZeroHoldBars);
        }
        if self.bar_minutes == 0 {
            return Err(ParamsError::ZeroBarMinutes);
        }
        if !self.score_threshold.is_finite() {
            return Err(ParamsError::NonFiniteThreshold(self.score_threshold));
        }
        if self.min_entry_gap_minutes < 0 {
            return Err(ParamsError::NegativeGap(self.min_entry_gap_minutes));
        }
        let l = &self.levels;
        for (name, value) in [("tp1", l.tp1), ("tp2", l.tp2), ("xp", l.xp), ("sl", l.sl)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ParamsError::InvalidLevel { name, value });
            }
        }
        if !(l.tp1 <= l.tp2 && l.tp2 <= l.xp) {
            return Err(ParamsError::UnorderedTargets);
        }
        Ok(())
    }

    pub fn min_entry_gap_ms(&self) -> i64 {
        self.min_entry_gap_minutes * crate::domain::MS_PER_MINUTE
    }

    /// Holding window expressed in hours.
    pub fn hold_hours(&self) -> f64 {
        self.hold_bars as f64 * f64::from(self.bar_minutes) / 60.0
    }

    /// Deterministic BLAKE3 fingerprint of the parameter set.
    ///
    /// Field order is fixed by the struct definition, so the JSON is canonical.
    pub fn fingerprint(&self) -> String {
        let json = serde_json::to_string(self).unwrap_or_default();
        blake3::hash(json.as_bytes()).to_hex().to_string()
    }
}
