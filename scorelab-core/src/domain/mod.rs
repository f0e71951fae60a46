//! Domain types for ScoreLab

pub mod entry;
mod lenient;
pub mod trail;
pub mod window;

pub use entry::{Direction, EntrySignal, Outcome, Signal, SignalSet, SimulatedEntry};
pub use trail::{SignalFlags, TrailPoint};
pub use window::{TimeWindow, MS_PER_DAY, MS_PER_MINUTE};

pub(crate) use lenient::{flags as lenient_flags, number as lenient_number, price as lenient_price};
pub(crate) use lenient::{string as lenient_string, timestamp as lenient_timestamp};
