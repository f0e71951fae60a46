//! Forward outcome simulation — MFE/MAE over a bounded holding window.
//!
//! There is no exit logic inside the walk: the position is force-closed at the
//! last examined sample and excursion bookkeeping is purely observational.
//!
//! Win/loss ordering is approximate. Only the timestamps of the single best
//! and single worst excursion are compared, so a path that crosses target and
//! stop several times in alternation can be misclassified.

use crate::domain::{Direction, Outcome, TrailPoint, MS_PER_MINUTE};
use crate::params::{BacktestParams, ExcursionLevels};

/// Direction-aware forward walker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutcomeSimulator {
    hold_bars: usize,
    levels: ExcursionLevels,
}

impl OutcomeSimulator {
    pub fn new(params: &BacktestParams) -> Self {
        Self::with_levels(params.hold_bars, params.levels)
    }

    pub fn with_levels(hold_bars: usize, levels: ExcursionLevels) -> Self {
        Self { hold_bars, levels }
    }

    /// Measure the outcome of a position opened at `trail[entry_index]`.
    ///
    /// Returns `None` if `entry_index` is out of range. The walk covers
    /// `entry_index + 1 ..= min(len - 1, entry_index + hold_bars)` and skips
    /// samples with an invalid price.
    pub fn simulate(
        &self,
        trail: &[TrailPoint],
        entry_index: usize,
        direction: Direction,
    ) -> Option<Outcome> {
        let entry = trail.get(entry_index)?;
        let entry_price = entry.price;
        let end_index = (trail.len() - 1).min(entry_index.saturating_add(self.hold_bars));

        let mut mfe = 0.0_f64;
        let mut mae = 0.0_f64;
        let mut mfe_ts = entry.ts;
        let mut mae_ts = entry.ts;
        let mut exit_price = entry_price;
        let mut exit_ts = entry.ts;

        for point in trail.iter().take(end_index + 1).skip(entry_index + 1) {
            if !point.has_valid_price() {
                continue;
            }
            let pnl = direction.signed_return(entry_price, point.price);
            if pnl > mfe {
                mfe = pnl;
                mfe_ts = point.ts;
            }
            if pnl < mae {
                mae = pnl;
                mae_ts = point.ts;
            }
            exit_price = point.price;
            exit_ts = point.ts;
        }

        let final_pnl_pct = direction.signed_return(entry_price, exit_price);

        let hit_tp1 = mfe >= self.levels.tp1;
        let hit_tp2 = mfe >= self.levels.tp2;
        let hit_xp = mfe >= self.levels.xp;
        let hit_sl = mae <= -self.levels.sl;

        let is_win = hit_tp1 && (!hit_sl || mfe_ts <= mae_ts);
        let is_loss = hit_sl && (!hit_tp1 || mae_ts < mfe_ts);

        Some(Outcome {
            entry_price,
            exit_price,
            entry_ts: entry.ts,
            exit_ts,
            final_pnl_pct,
            mfe,
            mae,
            mfe_ts,
            mae_ts,
            hit_tp1,
            hit_tp2,
            hit_xp,
            hit_sl,
            is_win,
            is_loss,
            hold_minutes: (exit_ts - entry.ts) as f64 / MS_PER_MINUTE as f64,
        })
    }
}
