//! Plain-text console report.

use scorelab_core::domain::TimeWindow;
use scorelab_core::BacktestParams;

use super::format::{fmt_lift, fmt_level, fmt_pct, fmt_pct_opt, MISSING};
use crate::aggregate::{BacktestReport, TickerRow};
use crate::metadata::iso_day;
use crate::runner::BacktestRun;

const RULE: &str = "═══════════════════════════════════════════════════════════════";

/// Printed instead of a report when the run produced no entries.
pub const NO_ENTRIES_MESSAGE: &str =
    "No entries found. Try lowering --threshold or extending --days.";

fn section(title: &str) -> String {
    format!("\n═══ {title} ═══\n")
}

/// Banner and run parameters, printed before loading starts.
pub fn render_header(params: &BacktestParams, window: TimeWindow) -> String {
    let mut out = String::new();
    out.push_str(RULE);
    out.push_str("\n  BACKTEST HARNESS: Scoring Rules vs Historical Outcomes\n");
    out.push_str(RULE);
    out.push('\n');
    out.push_str(&format!(
        "\nPeriod: {} to {}\n",
        iso_day(window.since_ms),
        iso_day(window.until_ms)
    ));
    out.push_str(&format!("Score threshold: >= {}\n", params.score_threshold));
    out.push_str(&format!(
        "Hold window: {} bars ({:.1} hours)\n",
        params.hold_bars,
        params.hold_hours()
    ));
    out
}

/// One-line load summary.
pub fn render_load_summary(run: &BacktestRun) -> String {
    format!(
        "\nFetched {} tickers ({} skipped). Found {} simulated entries.",
        run.fetched,
        run.skipped,
        run.entries.len()
    )
}

fn ticker_table(out: &mut String, title: &str, rows: &[TickerRow]) {
    out.push_str(&section(title));
    out.push_str("  Ticker  Entries  Win%   Total PnL\n");
    out.push_str("  ──────  ───────  ─────  ─────────\n");
    for t in rows {
        out.push_str(&format!(
            "  {:<6}  {:>7}  {:>5}  {:>9}\n",
            t.ticker,
            t.count,
            fmt_pct_opt(t.win_rate, 0),
            fmt_pct(t.total_pnl, 1)
        ));
    }
}

/// All six views as aligned text tables.
pub fn render_console(report: &BacktestReport, top_n: usize) -> String {
    let mut out = String::new();
    let o = &report.overall;
    let levels = &report.metadata.levels;

    out.push_str(&section("OVERALL PERFORMANCE"));
    out.push_str(&format!("  Total entries:     {}\n", o.total_entries));
    out.push_str(&format!(
        "  Wins / Losses:     {} / {} ({} neutral)\n",
        o.wins, o.losses, o.neutrals
    ));
    out.push_str(&format!("  Win rate:          {}\n", fmt_pct(o.win_rate, 1)));
    out.push_str(&format!("  Median MFE:        {}\n", fmt_pct_opt(o.avg_mfe, 1)));
    out.push_str(&format!("  Median MAE:        {}\n", fmt_pct_opt(o.avg_mae, 1)));
    out.push_str(&format!("  Median final PnL:  {}\n", fmt_pct_opt(o.median_pnl, 1)));
    out.push_str(&format!(
        "  MFE p25 / p75:     {} / {}\n",
        fmt_pct_opt(o.mfe_p25, 2),
        fmt_pct_opt(o.mfe_p75, 2)
    ));
    out.push_str(&format!(
        "  MAE p25 / p75:     {} / {}\n",
        fmt_pct_opt(o.mae_p25, 2),
        fmt_pct_opt(o.mae_p75, 2)
    ));
    out.push_str(&format!(
        "  TP1 hit rate:      {} ({})\n",
        fmt_pct(o.tp1_hit_rate, 1),
        fmt_level(levels.tp1)
    ));
    out.push_str(&format!(
        "  TP2 hit rate:      {} ({})\n",
        fmt_pct(o.tp2_hit_rate, 1),
        fmt_level(levels.tp2)
    ));
    out.push_str(&format!(
        "  XP hit rate:       {} ({})\n",
        fmt_pct(o.xp_hit_rate, 1),
        fmt_level(levels.xp)
    ));

    out.push_str(&section("PERFORMANCE BY SCORE BUCKET"));
    out.push_str("  Score      Count  Win%   MFE     MAE      Median PnL  TP1%   TP2%\n");
    out.push_str("  ─────────  ─────  ─────  ──────  ───────  ──────────  ─────  ─────\n");
    for b in &report.score_buckets {
        let Some(s) = &b.stats else { continue };
        out.push_str(&format!(
            "  {:<9}  {:>5}  {:>5}  {:>6}  {:>7}  {:>10}  {:>5}  {:>5}\n",
            b.label,
            b.count,
            fmt_pct(s.win_rate, 0),
            fmt_pct(s.median_mfe, 1),
            fmt_pct(s.median_mae, 1),
            fmt_pct(s.median_pnl, 1),
            fmt_pct(s.tp1_rate, 0),
            fmt_pct(s.tp2_rate, 0)
        ));
    }

    out.push_str(&section("CUMULATIVE THRESHOLD ANALYSIS"));
    out.push_str("  Score>=  Count  Win%   Avg PnL     Expectancy\n");
    out.push_str("  ───────  ─────  ─────  ──────────  ──────────\n");
    for t in &report.threshold_analysis {
        let Some(s) = &t.stats else { continue };
        out.push_str(&format!(
            "  >= {:<4}  {:>5}  {:>5}  {:>10}  {:>10}\n",
            t.threshold,
            t.count,
            fmt_pct(s.win_rate, 0),
            fmt_pct(s.avg_pnl, 1),
            fmt_pct(s.expectancy, 1)
        ));
    }

    out.push_str(&section("SIGNAL PREDICTIVE POWER"));
    out.push_str("  Signal             With(N)  Win%    Without(N)  Win%    Lift\n");
    out.push_str("  ─────────────────  ───────  ──────  ──────────  ──────  ──────\n");
    for s in &report.signal_power {
        if s.with.count == 0 && s.without.count == 0 {
            continue;
        }
        let with_rate = s.with.detail.as_ref().map(|d| d.win_rate);
        let without_rate = s.without.detail.as_ref().map(|d| d.win_rate);
        let lift = if s.lift.is_some() {
            fmt_lift(s.lift)
        } else {
            format!("{MISSING:>6}")
        };
        out.push_str(&format!(
            "  {:<19}  {:>6}  {:>6}  {:>9}  {:>6}  {}\n",
            s.signal.as_str(),
            s.with.count,
            fmt_pct_opt(with_rate, 0),
            s.without.count,
            fmt_pct_opt(without_rate, 0),
            lift
        ));
    }

    out.push_str(&section("DIRECTION ANALYSIS"));
    out.push_str("  Dir    Count  Win%   MFE     MAE      Median PnL\n");
    out.push_str("  ─────  ─────  ─────  ──────  ───────  ──────────\n");
    for d in &report.direction_analysis {
        out.push_str(&format!(
            "  {:<5}  {:>5}  {:>5}  {:>6}  {:>7}  {:>10}\n",
            d.label.as_str(),
            d.count,
            fmt_pct(d.win_rate, 0),
            fmt_pct_opt(d.median_mfe, 1),
            fmt_pct_opt(d.median_mae, 1),
            fmt_pct_opt(d.median_pnl, 1)
        ));
    }

    let top: Vec<TickerRow> = report.top_tickers.iter().take(top_n).cloned().collect();
    let bottom: Vec<TickerRow> = report.bottom_tickers.iter().take(top_n).cloned().collect();
    ticker_table(&mut out, &format!("TOP {top_n} TICKERS (by total PnL)"), &top);
    ticker_table(&mut out, &format!("BOTTOM {top_n} TICKERS (by total PnL)"), &bottom);

    out
}
