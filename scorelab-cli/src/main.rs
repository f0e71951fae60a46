//! ScoreLab CLI: replay historical score trails and report how entries would have played out.
//!
//! Usage:
//! - `scorelab --days 14 --threshold 60`
//! - `scorelab --since 2026-01-25 --until 2026-02-07`
//! - `scorelab --synthetic --entries-csv out/entries.csv`

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::{debug, info};

use scorelab_core::data::{SyntheticProvider, TimedApiProvider, TrailProvider};
use scorelab_runner::reporting::{
    render_console, render_header, render_load_summary, save_report, NO_ENTRIES_MESSAGE,
};
use scorelab_runner::{run_backtest, BacktestConfig, StdoutProgress};

#[derive(Parser, Debug)]
#[command(
    name = "scorelab",
    about = "ScoreLab: backtest scoring rules against historical outcomes"
)]
struct Cli {
    /// Optional TOML config; flags below override it.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Window length in days ending now (ignored when --since is given).
    #[arg(long)]
    days: Option<u32>,

    /// Window start (YYYY-MM-DD, UTC midnight).
    #[arg(long)]
    since: Option<NaiveDate>,

    /// Window end (YYYY-MM-DD, inclusive).
    #[arg(long)]
    until: Option<NaiveDate>,

    /// Minimum score for a point to become an entry.
    #[arg(long)]
    threshold: Option<f64>,

    /// Maximum forward bars examined per entry.
    #[arg(long)]
    hold: Option<usize>,

    /// JSON report path.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Markdown report path.
    #[arg(long)]
    md: Option<PathBuf>,

    /// Also write every simulated entry to this CSV file.
    #[arg(long)]
    entries_csv: Option<PathBuf>,

    /// Comma-separated tickers; skips the universe endpoint.
    #[arg(long, value_delimiter = ',')]
    tickers: Option<Vec<String>>,

    /// Maximum trail records requested per ticker.
    #[arg(long)]
    limit: Option<usize>,

    /// Use deterministic synthetic trails instead of the service.
    #[arg(long, default_value_t = false)]
    synthetic: bool,

    /// Base URL of the trail service.
    #[arg(long, env = "API_BASE")]
    api_base: Option<String>,

    /// Log skipped tickers and debug output.
    #[arg(long, default_value_t = false)]
    verbose: bool,
}

impl Cli {
    /// Layer the flags that were given over `config`.
    fn apply(&self, config: &mut BacktestConfig) {
        if let Some(days) = self.days {
            config.window.days = days;
        }
        if self.since.is_some() {
            config.window.since = self.since;
        }
        if self.until.is_some() {
            config.window.until = self.until;
        }
        if let Some(threshold) = self.threshold {
            config.params.score_threshold = threshold;
        }
        if let Some(hold) = self.hold {
            config.params.hold_bars = hold;
        }
        if let Some(json) = &self.json {
            config.output.json = json.clone();
        }
        if let Some(md) = &self.md {
            config.output.md = md.clone();
        }
        if self.entries_csv.is_some() {
            config.output.entries_csv = self.entries_csv.clone();
        }
        if let Some(tickers) = &self.tickers {
            let list: Vec<String> = tickers
                .iter()
                .map(|t| t.trim().to_uppercase())
                .filter(|t| !t.is_empty())
                .collect();
            config.source.tickers = Some(list);
        }
        if let Some(limit) = self.limit {
            config.source.limit = limit;
        }
        if self.synthetic {
            config.source.synthetic = true;
        }
        if let Some(base) = &self.api_base {
            config.source.api_base = base.clone();
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "info,scorelab_core=debug,scorelab_runner=debug,scorelab=debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default.into()),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let mut config = match &cli.config {
        Some(path) => BacktestConfig::from_file(path)?,
        None => BacktestConfig::default(),
    };
    cli.apply(&mut config);
    config.validate()?;

    let window = config.window.resolve(Utc::now().timestamp_millis())?;
    debug!(?config, "resolved configuration");

    let provider: Box<dyn TrailProvider> = if config.source.synthetic {
        Box::new(SyntheticProvider::with_default_universe(
            window.until_ms,
            config.params.bar_minutes,
        ))
    } else {
        let api = TimedApiProvider::new(config.source.api_base.as_str())
            .context("failed to build trail service client")?;
        Box::new(api)
    };
    info!(provider = provider.name(), "data source ready");

    println!("{}", render_header(&config.params, window));

    let progress = StdoutProgress::default();
    let run = run_backtest(
        &config,
        provider.as_ref(),
        window,
        Some(&progress),
        cli.verbose,
    )?;
    println!("{}", render_load_summary(&run));

    let Some(report) = &run.report else {
        println!("\n{NO_ENTRIES_MESSAGE}");
        return Ok(());
    };

    print!("{}", render_console(report, config.report.console_top));

    let saved = save_report(report, &run.entries, &config.output, &config.report)?;
    println!("\n[backtest] JSON saved: {}", saved.json.display());
    println!("[backtest] Markdown saved: {}", saved.markdown.display());
    if let Some(csv) = &saved.entries_csv {
        println!("[backtest] Entries CSV saved: {}", csv.display());
    }
    println!("\n═══ DONE ═══");

    Ok(())
}
