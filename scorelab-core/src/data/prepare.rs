//! Trail preparation: raw service records to a sorted, windowed trail.

use thiserror::Error;

use super::wire::RawTrailPoint;
use crate::domain::{TimeWindow, TrailPoint};

/// Not enough history to scan an instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HistoryShortfall {
    #[error("only {got} raw records (need {need})")]
    Raw { got: usize, need: usize },

    #[error("only {got} records inside the window (need {need})")]
    Window { got: usize, need: usize },
}

/// Sort by `ts`, keep the inclusive window, and enforce `min_points` on both
/// the raw payload and the windowed result.
///
/// Records without a timestamp are dropped. The sort is stable, so duplicate
/// timestamps keep their payload order.
pub fn prepare_trail(
    ticker: &str,
    raw: Vec<RawTrailPoint>,
    window: TimeWindow,
    min_points: usize,
) -> Result<Vec<TrailPoint>, HistoryShortfall> {
    if raw.len() < min_points {
        return Err(HistoryShortfall::Raw {
            got: raw.len(),
            need: min_points,
        });
    }

    let mut trail: Vec<TrailPoint> = raw
        .into_iter()
        .filter_map(|r| r.into_point(ticker))
        .collect();
    trail.sort_by_key(|p| p.ts);
    trail.retain(|p| window.contains(p.ts));

    if trail.len() < min_points {
        return Err(HistoryShortfall::Window {
            got: trail.len(),
            need: min_points,
        });
    }
    Ok(trail)
}
