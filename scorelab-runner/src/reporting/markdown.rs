//! Markdown report generator.

use super::format::{fmt_lift, fmt_level, fmt_pct, fmt_pct_opt};
use crate::aggregate::{BacktestReport, TickerRow};

fn ticker_section(md: &mut String, title: &str, rows: &[TickerRow]) {
    md.push_str(&format!("\n## {title}\n\n"));
    md.push_str("| Ticker | Entries | Win% | Total PnL |\n");
    md.push_str("|---|---|---|---|\n");
    for t in rows {
        md.push_str(&format!(
            "| {} | {} | {} | {} |\n",
            t.ticker,
            t.count,
            fmt_pct_opt(t.win_rate, 1),
            fmt_pct(t.total_pnl, 1)
        ));
    }
}

/// One GFM table per view, preceded by the run metadata.
pub fn render_markdown(report: &BacktestReport, top_n: usize) -> String {
    let m = &report.metadata;
    let o = &report.overall;
    let skips = &m.skip_reasons;

    let mut md = String::from("# Backtest Results\n\n");
    md.push_str(&format!("**Run date:** {}  \n", m.run_date));
    md.push_str(&format!(
        "**Period:** {} to {}  \n",
        day_of(&m.period.since),
        day_of(&m.period.until)
    ));
    md.push_str(&format!("**Score threshold:** >= {}  \n", m.score_threshold));
    md.push_str(&format!(
        "**Hold window:** {} bars ({:.1} hours)  \n",
        m.hold_bars, m.hold_hours
    ));
    md.push_str(&format!(
        "**Tickers:** {} fetched, {} skipped ({} short raw history, {} short window history, {} fetch errors)  \n",
        m.tickers_fetched,
        m.tickers_skipped,
        skips.insufficient_raw_history,
        skips.insufficient_window_history,
        skips.fetch_failed
    ));
    md.push_str(&format!("**Data source:** {}  \n", m.data_source.as_str()));
    md.push_str(&format!("**Params fingerprint:** `{}`  \n\n", m.params_fingerprint));

    md.push_str("## Overall Performance\n\n");
    md.push_str("| Metric | Value |\n|---|---|\n");
    md.push_str(&format!("| Total entries | {} |\n", o.total_entries));
    md.push_str(&format!(
        "| Wins / Losses | {} / {} ({} neutral) |\n",
        o.wins, o.losses, o.neutrals
    ));
    md.push_str(&format!("| Win rate | {} |\n", fmt_pct(o.win_rate, 1)));
    md.push_str(&format!("| Median MFE | {} |\n", fmt_pct_opt(o.avg_mfe, 1)));
    md.push_str(&format!("| Median MAE | {} |\n", fmt_pct_opt(o.avg_mae, 1)));
    md.push_str(&format!("| Median PnL | {} |\n", fmt_pct_opt(o.median_pnl, 1)));
    md.push_str(&format!(
        "| MFE p25 / p75 | {} / {} |\n",
        fmt_pct_opt(o.mfe_p25, 2),
        fmt_pct_opt(o.mfe_p75, 2)
    ));
    md.push_str(&format!(
        "| MAE p25 / p75 | {} / {} |\n",
        fmt_pct_opt(o.mae_p25, 2),
        fmt_pct_opt(o.mae_p75, 2)
    ));
    md.push_str(&format!(
        "| TP1 hit rate ({}) | {} |\n",
        fmt_level(m.levels.tp1),
        fmt_pct(o.tp1_hit_rate, 1)
    ));
    md.push_str(&format!(
        "| TP2 hit rate ({}) | {} |\n",
        fmt_level(m.levels.tp2),
        fmt_pct(o.tp2_hit_rate, 1)
    ));
    md.push_str(&format!(
        "| XP hit rate ({}) | {} |\n\n",
        fmt_level(m.levels.xp),
        fmt_pct(o.xp_hit_rate, 1)
    ));

    md.push_str("## Score Bucket Performance\n\n");
    md.push_str("| Score | Count | Win% | MFE | MAE | Median PnL | TP1% | TP2% |\n");
    md.push_str("|---|---|---|---|---|---|---|---|\n");
    for b in &report.score_buckets {
        let Some(s) = &b.stats else { continue };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
            b.label,
            b.count,
            fmt_pct(s.win_rate, 1),
            fmt_pct(s.median_mfe, 1),
            fmt_pct(s.median_mae, 1),
            fmt_pct(s.median_pnl, 1),
            fmt_pct(s.tp1_rate, 1),
            fmt_pct(s.tp2_rate, 1)
        ));
    }

    md.push_str("\n## Threshold Analysis (cumulative)\n\n");
    md.push_str("| Score >= | Count | Win% | Avg PnL | Expectancy |\n");
    md.push_str("|---|---|---|---|---|\n");
    for t in &report.threshold_analysis {
        let Some(s) = &t.stats else { continue };
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            t.threshold,
            t.count,
            fmt_pct(s.win_rate, 1),
            fmt_pct(s.avg_pnl, 1),
            fmt_pct(s.expectancy, 1)
        ));
    }

    md.push_str("\n## Signal Predictive Power\n\n");
    md.push_str("| Signal | With (N) | Win% | Without (N) | Win% | Lift |\n");
    md.push_str("|---|---|---|---|---|---|\n");
    for s in &report.signal_power {
        if s.with.count == 0 && s.without.count == 0 {
            continue;
        }
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            s.signal,
            s.with.count,
            fmt_pct_opt(s.with.detail.as_ref().map(|d| d.win_rate), 1),
            s.without.count,
            fmt_pct_opt(s.without.detail.as_ref().map(|d| d.win_rate), 1),
            fmt_lift(s.lift)
        ));
    }

    md.push_str("\n## Direction Analysis\n\n");
    md.push_str("| Dir | Count | Win% | MFE | MAE | Median PnL |\n");
    md.push_str("|---|---|---|---|---|---|\n");
    for d in &report.direction_analysis {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} |\n",
            d.label,
            d.count,
            fmt_pct(d.win_rate, 1),
            fmt_pct_opt(d.median_mfe, 1),
            fmt_pct_opt(d.median_mae, 1),
            fmt_pct_opt(d.median_pnl, 1)
        ));
    }

    let top: Vec<TickerRow> = report.top_tickers.iter().take(top_n).cloned().collect();
    let bottom: Vec<TickerRow> = report.bottom_tickers.iter().take(top_n).cloned().collect();
    ticker_section(&mut md, &format!("Top {top_n} Tickers"), &top);
    ticker_section(&mut md, &format!("Bottom {top_n} Tickers"), &bottom);

    md
}

/// `YYYY-MM-DD` prefix of an ISO timestamp.
fn day_of(iso: &str) -> &str {
    iso.get(..10).unwrap_or(iso)
}
