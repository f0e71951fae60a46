//! Report export: JSON, Markdown and the entry tape CSV.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

use scorelab_core::domain::SimulatedEntry;

use super::markdown::render_markdown;
use crate::aggregate::BacktestReport;
use crate::config::{OutputConfig, ReportConfig};
use crate::metadata::iso_millis;

/// Paths actually written by `save_report`.
#[derive(Debug, Clone, PartialEq)]
pub struct SavedPaths {
    pub json: PathBuf,
    pub markdown: PathBuf,
    pub entries_csv: Option<PathBuf>,
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

pub fn write_json(path: &Path, report: &BacktestReport) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

pub fn write_markdown(path: &Path, report: &BacktestReport, top_n: usize) -> Result<()> {
    ensure_parent(path)?;
    fs::write(path, render_markdown(report, top_n))
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// One CSV row per simulated entry.
#[derive(Debug, Serialize)]
struct EntryRow<'a> {
    ticker: &'a str,
    ts: i64,
    time: String,
    direction: &'static str,
    score: f64,
    state: &'a str,
    signals: String,
    completion: Option<f64>,
    phase: Option<f64>,
    entry_price: f64,
    exit_price: f64,
    exit_ts: i64,
    final_pnl_pct: f64,
    mfe: f64,
    mae: f64,
    hit_tp1: bool,
    hit_tp2: bool,
    hit_xp: bool,
    hit_sl: bool,
    is_win: bool,
    is_loss: bool,
    hold_minutes: f64,
}

impl<'a> From<&'a SimulatedEntry> for EntryRow<'a> {
    fn from(e: &'a SimulatedEntry) -> Self {
        let o = &e.outcome;
        Self {
            ticker: &e.ticker,
            ts: e.ts,
            time: iso_millis(e.ts),
            direction: e.direction.as_str(),
            score: e.score,
            state: &e.state,
            signals: e
                .signals
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join("|"),
            completion: e.completion,
            phase: e.phase,
            entry_price: o.entry_price,
            exit_price: o.exit_price,
            exit_ts: o.exit_ts,
            final_pnl_pct: o.final_pnl_pct,
            mfe: o.mfe,
            mae: o.mae,
            hit_tp1: o.hit_tp1,
            hit_tp2: o.hit_tp2,
            hit_xp: o.hit_xp,
            hit_sl: o.hit_sl,
            is_win: o.is_win,
            is_loss: o.is_loss,
            hold_minutes: o.hold_minutes,
        }
    }
}

pub fn write_entries_csv(path: &Path, entries: &[SimulatedEntry]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create entries CSV {}", path.display()))?;
    for entry in entries {
        writer
            .serialize(EntryRow::from(entry))
            .with_context(|| format!("Failed to write entry row to {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to flush {}", path.display()))?;
    Ok(())
}

/// Write every configured output for a finished run.
pub fn save_report(
    report: &BacktestReport,
    entries: &[SimulatedEntry],
    output: &OutputConfig,
    report_cfg: &ReportConfig,
) -> Result<SavedPaths> {
    write_json(&output.json, report)?;
    write_markdown(&output.md, report, report_cfg.console_top)?;
    if let Some(csv_path) = &output.entries_csv {
        write_entries_csv(csv_path, entries)?;
    }
    Ok(SavedPaths {
        json: output.json.clone(),
        markdown: output.md.clone(),
        entries_csv: output.entries_csv.clone(),
    })
}
