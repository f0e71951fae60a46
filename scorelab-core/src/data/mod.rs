//! Trail data: providers, wire format, preparation

pub mod prepare;
pub mod provider;
pub mod synthetic;
pub mod timed_api;
pub mod wire;

pub use prepare::{prepare_trail, HistoryShortfall};
pub use provider::{DataError, DataSource, TrailProvider};
pub use synthetic::{SyntheticProvider, DEFAULT_SYNTHETIC_UNIVERSE};
pub use timed_api::{TimedApiProvider, DEFAULT_API_BASE};
pub use wire::{parse_trail, parse_universe, RawTrailPoint};
