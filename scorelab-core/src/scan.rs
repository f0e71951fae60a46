//! Trail scan — walks one instrument's prepared trail and emits simulated entries.
//!
//! Per point: spacing check against the last accepted entry, detection, score
//! gate, forward simulation. Only accepted entries move the spacing anchor.

use crate::detector::EntryDetector;
use crate::domain::{SimulatedEntry, TrailPoint};
use crate::params::BacktestParams;
use crate::simulator::OutcomeSimulator;

/// Detector + simulator + per-instrument spacing rule.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrailScanner {
    detector: EntryDetector,
    simulator: OutcomeSimulator,
    min_gap_ms: i64,
    hold_bars: usize,
    require_full_window: bool,
}

impl TrailScanner {
    pub fn new(params: &BacktestParams) -> Self {
        Self {
            detector: EntryDetector::new(params),
            simulator: OutcomeSimulator::new(params),
            min_gap_ms: params.min_entry_gap_ms(),
            hold_bars: params.hold_bars,
            require_full_window: params.require_full_window,
        }
    }

    /// Scan a trail sorted by `ts` ascending.
    pub fn scan(&self, ticker: &str, trail: &[TrailPoint]) -> Vec<SimulatedEntry> {
        let scan_end = if self.require_full_window {
            trail.len().saturating_sub(self.hold_bars)
        } else {
            trail.len()
        };

        let mut entries = Vec::new();
        let mut last_entry_ts: Option<i64> = None;

        for (i, point) in trail.iter().enumerate().take(scan_end) {
            if let Some(last) = last_entry_ts {
                if point.ts - last < self.min_gap_ms {
                    continue;
                }
            }

            let Some(signal) = self.detector.detect(point) else {
                continue;
            };
            if !signal.should_enter {
                continue;
            }
            let Some(outcome) = self.simulator.simulate(trail, i, signal.direction) else {
                continue;
            };

            entries.push(SimulatedEntry {
                ticker: ticker.to_string(),
                ts: point.ts,
                price: point.price,
                direction: signal.direction,
                score: signal.score,
                signals: signal.signals,
                completion: signal.completion,
                phase: signal.phase,
                state: point.state.clone(),
                outcome,
            });
            last_entry_ts = Some(point.ts);
        }

        entries
    }
}
