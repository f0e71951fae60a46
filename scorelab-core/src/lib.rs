//! ScoreLab Core — trail domain types, entry detection, forward outcome simulation.
//!
//! This crate contains the heart of the scoring backtest:
//! - Domain types (trail points, signals, simulated entries, outcomes)
//! - Immutable backtest parameters with a stable fingerprint
//! - Stateless entry detector and forward outcome simulator
//! - Per-instrument trail scan with entry spacing
//! - Trail providers (HTTP service, synthetic) and trail preparation

pub mod data;
pub mod detector;
pub mod domain;
pub mod params;
pub mod scan;
pub mod simulator;
pub mod stats;

pub use detector::EntryDetector;
pub use params::{BacktestParams, ExcursionLevels, ParamsError};
pub use scan::TrailScanner;
pub use simulator::OutcomeSimulator;
