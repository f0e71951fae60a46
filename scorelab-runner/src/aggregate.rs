//! Report aggregation over all simulated entries.
//!
//! Six views: overall, score buckets, cumulative thresholds, per-signal lift,
//! per-direction and per-ticker. Empty groups keep their row with `count: 0`
//! and no statistics, so the JSON shape is stable across runs.

use std::collections::HashMap;

use serde::Serialize;

use scorelab_core::domain::{Direction, Signal, SimulatedEntry};
use scorelab_core::stats::{mean, median, percentile, ratio, win_rate};

use crate::config::ReportConfig;
use crate::metadata::RunMetadata;
use crate::reporting::number::{whole, whole_opt};

/// Complete aggregated result of a run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestReport {
    pub metadata: RunMetadata,
    pub overall: OverallStats,
    pub score_buckets: Vec<BucketRow>,
    pub threshold_analysis: Vec<ThresholdRow>,
    pub signal_power: Vec<SignalRow>,
    pub direction_analysis: Vec<DirectionRow>,
    pub top_tickers: Vec<TickerRow>,
    pub bottom_tickers: Vec<TickerRow>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverallStats {
    pub total_entries: usize,
    pub wins: usize,
    pub losses: usize,
    pub neutrals: usize,
    pub win_rate: f64,
    #[serde(rename = "avgMFE")]
    pub avg_mfe: Option<f64>,
    #[serde(rename = "avgMAE")]
    pub avg_mae: Option<f64>,
    pub median_pnl: Option<f64>,
    pub tp1_hit_rate: f64,
    pub tp2_hit_rate: f64,
    pub xp_hit_rate: f64,
    #[serde(rename = "mfeP25")]
    pub mfe_p25: Option<f64>,
    #[serde(rename = "mfeP75")]
    pub mfe_p75: Option<f64>,
    #[serde(rename = "maeP25")]
    pub mae_p25: Option<f64>,
    #[serde(rename = "maeP75")]
    pub mae_p75: Option<f64>,
    pub mean_hold_minutes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketRow {
    pub label: String,
    #[serde(serialize_with = "whole")]
    pub min: f64,
    /// `None` for the open-ended top bucket.
    #[serde(serialize_with = "whole_opt")]
    pub max: Option<f64>,
    pub count: usize,
    #[serde(flatten)]
    pub stats: Option<BucketStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketStats {
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    #[serde(rename = "medianMFE")]
    pub median_mfe: f64,
    #[serde(rename = "medianMAE")]
    pub median_mae: f64,
    pub median_pnl: f64,
    pub tp1_rate: f64,
    pub tp2_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdRow {
    #[serde(serialize_with = "whole")]
    pub threshold: f64,
    pub count: usize,
    #[serde(flatten)]
    pub stats: Option<ThresholdStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ThresholdStats {
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
    pub total_pnl: f64,
    pub avg_pnl: f64,
    pub median_pnl: f64,
    /// Decided-entry expectancy from median win MFE and median loss MAE.
    pub expectancy: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignalRow {
    pub signal: Signal,
    pub with: PartitionStats,
    pub without: PartitionStats,
    /// Win-rate difference, only when both partitions are non-empty.
    pub lift: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PartitionStats {
    pub count: usize,
    #[serde(flatten)]
    pub detail: Option<PartitionDetail>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PartitionDetail {
    pub win_rate: f64,
    #[serde(rename = "medianMFE")]
    pub median_mfe: f64,
    #[serde(rename = "medianMAE")]
    pub median_mae: f64,
    pub median_pnl: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectionRow {
    pub label: Direction,
    pub count: usize,
    pub win_rate: f64,
    #[serde(rename = "medianMFE")]
    pub median_mfe: Option<f64>,
    #[serde(rename = "medianMAE")]
    pub median_mae: Option<f64>,
    pub median_pnl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerRow {
    pub ticker: String,
    pub count: usize,
    pub wins: usize,
    pub losses: usize,
    /// `None` when none of the ticker's entries was decided.
    pub win_rate: Option<f64>,
    pub total_pnl: f64,
    pub median_pnl: f64,
}

/// Build every view of the report.
pub fn build_report(
    entries: &[SimulatedEntry],
    metadata: RunMetadata,
    cfg: &ReportConfig,
) -> BacktestReport {
    let ranked = ticker_ranking(entries, cfg.min_ticker_entries);
    let top_tickers = ranked.iter().take(cfg.saved_top).cloned().collect();
    let bottom_tickers = ranked.iter().rev().take(cfg.saved_top).cloned().collect();

    BacktestReport {
        metadata,
        overall: overall(entries),
        score_buckets: score_buckets(entries, &cfg.bucket_edges),
        threshold_analysis: threshold_analysis(entries, &cfg.thresholds),
        signal_power: signal_power(entries),
        direction_analysis: direction_analysis(entries),
        top_tickers,
        bottom_tickers,
    }
}

// ── Per-group helpers ────────────────────────────────────────────────

fn count_outcomes(entries: &[&SimulatedEntry]) -> (usize, usize) {
    let wins = entries.iter().filter(|e| e.outcome.is_win).count();
    let losses = entries.iter().filter(|e| e.outcome.is_loss).count();
    (wins, losses)
}

fn collect(entries: &[&SimulatedEntry], f: impl Fn(&SimulatedEntry) -> f64) -> Vec<f64> {
    entries.iter().map(|&e| f(e)).collect()
}

fn mfes(entries: &[&SimulatedEntry]) -> Vec<f64> {
    collect(entries, |e| e.outcome.mfe)
}

fn maes(entries: &[&SimulatedEntry]) -> Vec<f64> {
    collect(entries, |e| e.outcome.mae)
}

fn pnls(entries: &[&SimulatedEntry]) -> Vec<f64> {
    collect(entries, |e| e.outcome.final_pnl_pct)
}

fn rate(entries: &[&SimulatedEntry], pred: impl Fn(&SimulatedEntry) -> bool) -> f64 {
    ratio(entries.iter().filter(|&&e| pred(e)).count(), entries.len())
}

// ── Views ────────────────────────────────────────────────────────────

pub fn overall(entries: &[SimulatedEntry]) -> OverallStats {
    let all: Vec<&SimulatedEntry> = entries.iter().collect();
    let (wins, losses) = count_outcomes(&all);
    let mfe = mfes(&all);
    let mae = maes(&all);
    let holds = collect(&all, |e| e.outcome.hold_minutes);

    OverallStats {
        total_entries: all.len(),
        wins,
        losses,
        neutrals: all.len() - wins - losses,
        win_rate: win_rate(wins, losses),
        avg_mfe: median(&mfe),
        avg_mae: median(&mae),
        median_pnl: median(&pnls(&all)),
        tp1_hit_rate: rate(&all, |e| e.outcome.hit_tp1),
        tp2_hit_rate: rate(&all, |e| e.outcome.hit_tp2),
        xp_hit_rate: rate(&all, |e| e.outcome.hit_xp),
        mfe_p25: percentile(&mfe, 25.0),
        mfe_p75: percentile(&mfe, 75.0),
        mae_p25: percentile(&mae, 25.0),
        mae_p75: percentile(&mae, 75.0),
        mean_hold_minutes: mean(&holds),
    }
}

/// Bucket label for `[min, max)`; the open-ended bucket is `"min+"`.
pub fn bucket_label(min: f64, max: Option<f64>) -> String {
    match max {
        Some(max) => format!("{min}-{max}"),
        None => format!("{min}+"),
    }
}

pub fn score_buckets(entries: &[SimulatedEntry], edges: &[f64]) -> Vec<BucketRow> {
    edges
        .iter()
        .enumerate()
        .map(|(i, &min)| {
            let max = edges.get(i + 1).copied();
            let members: Vec<&SimulatedEntry> = entries
                .iter()
                .filter(|e| e.score >= min && max.map_or(true, |m| e.score < m))
                .collect();

            let stats = (!members.is_empty()).then(|| {
                let (wins, losses) = count_outcomes(&members);
                BucketStats {
                    wins,
                    losses,
                    win_rate: win_rate(wins, losses),
                    median_mfe: median(&mfes(&members)).unwrap_or(0.0),
                    median_mae: median(&maes(&members)).unwrap_or(0.0),
                    median_pnl: median(&pnls(&members)).unwrap_or(0.0),
                    tp1_rate: rate(&members, |e| e.outcome.hit_tp1),
                    tp2_rate: rate(&members, |e| e.outcome.hit_tp2),
                }
            });

            BucketRow {
                label: bucket_label(min, max),
                min,
                max,
                count: members.len(),
                stats,
            }
        })
        .collect()
}

/// `(wins · median(mfe | win) + losses · median(mae | loss)) / (wins + losses)`.
///
/// Medians of empty sets count as 0, and the result is 0 with nothing decided.
pub fn expectancy(entries: &[&SimulatedEntry]) -> f64 {
    let winners: Vec<&SimulatedEntry> =
        entries.iter().copied().filter(|e| e.outcome.is_win).collect();
    let losers: Vec<&SimulatedEntry> =
        entries.iter().copied().filter(|e| e.outcome.is_loss).collect();
    let decided = winners.len() + losers.len();
    if decided == 0 {
        return 0.0;
    }
    let win_mfe = median(&mfes(&winners)).unwrap_or(0.0);
    let loss_mae = median(&maes(&losers)).unwrap_or(0.0);
    (winners.len() as f64 * win_mfe + losers.len() as f64 * loss_mae) / decided as f64
}

pub fn threshold_analysis(entries: &[SimulatedEntry], thresholds: &[f64]) -> Vec<ThresholdRow> {
    thresholds
        .iter()
        .map(|&threshold| {
            let members: Vec<&SimulatedEntry> =
                entries.iter().filter(|e| e.score >= threshold).collect();

            let stats = (!members.is_empty()).then(|| {
                let (wins, losses) = count_outcomes(&members);
                let pnl = pnls(&members);
                let total_pnl: f64 = pnl.iter().sum();
                ThresholdStats {
                    wins,
                    losses,
                    win_rate: win_rate(wins, losses),
                    total_pnl,
                    avg_pnl: total_pnl / members.len() as f64,
                    median_pnl: median(&pnl).unwrap_or(0.0),
                    expectancy: expectancy(&members),
                }
            });

            ThresholdRow {
                threshold,
                count: members.len(),
                stats,
            }
        })
        .collect()
}

fn partition_stats(members: &[&SimulatedEntry]) -> PartitionStats {
    let detail = (!members.is_empty()).then(|| {
        let (wins, losses) = count_outcomes(members);
        PartitionDetail {
            win_rate: win_rate(wins, losses),
            median_mfe: median(&mfes(members)).unwrap_or(0.0),
            median_mae: median(&maes(members)).unwrap_or(0.0),
            median_pnl: median(&pnls(members)).unwrap_or(0.0),
        }
    });
    PartitionStats {
        count: members.len(),
        detail,
    }
}

pub fn signal_power(entries: &[SimulatedEntry]) -> Vec<SignalRow> {
    Signal::ALL
        .iter()
        .map(|&signal| {
            let (has, lacks): (Vec<&SimulatedEntry>, Vec<&SimulatedEntry>) =
                entries.iter().partition(|e| e.has_signal(signal));
            let with = partition_stats(&has);
            let without = partition_stats(&lacks);
            let lift = match (&with.detail, &without.detail) {
                (Some(w), Some(wo)) => Some(w.win_rate - wo.win_rate),
                _ => None,
            };
            SignalRow {
                signal,
                with,
                without,
                lift,
            }
        })
        .collect()
}

pub fn direction_analysis(entries: &[SimulatedEntry]) -> Vec<DirectionRow> {
    [Direction::Long, Direction::Short]
        .into_iter()
        .map(|direction| {
            let members: Vec<&SimulatedEntry> =
                entries.iter().filter(|e| e.direction == direction).collect();
            let (wins, losses) = count_outcomes(&members);
            DirectionRow {
                label: direction,
                count: members.len(),
                win_rate: win_rate(wins, losses),
                median_mfe: median(&mfes(&members)),
                median_mae: median(&maes(&members)),
                median_pnl: median(&pnls(&members)),
            }
        })
        .collect()
}

/// Tickers with at least `min_entries` entries, best total PnL first.
pub fn ticker_ranking(entries: &[SimulatedEntry], min_entries: usize) -> Vec<TickerRow> {
    // Groups keep first-seen order so the stable sort breaks PnL ties by it.
    let mut slot: HashMap<&str, usize> = HashMap::new();
    let mut by_ticker: Vec<(&str, Vec<&SimulatedEntry>)> = Vec::new();
    for e in entries {
        let i = *slot.entry(e.ticker.as_str()).or_insert_with(|| {
            by_ticker.push((e.ticker.as_str(), Vec::new()));
            by_ticker.len() - 1
        });
        by_ticker[i].1.push(e);
    }

    let mut rows: Vec<TickerRow> = by_ticker
        .into_iter()
        .filter(|(_, members)| members.len() >= min_entries.max(1))
        .map(|(ticker, members)| {
            let (wins, losses) = count_outcomes(&members);
            let pnl = pnls(&members);
            TickerRow {
                ticker: ticker.to_string(),
                count: members.len(),
                wins,
                losses,
                win_rate: (wins + losses > 0).then(|| win_rate(wins, losses)),
                total_pnl: pnl.iter().sum(),
                median_pnl: median(&pnl).unwrap_or(0.0),
            }
        })
        .collect();

    rows.sort_by(|a, b| b.total_pnl.total_cmp(&a.total_pnl));
    rows
}
