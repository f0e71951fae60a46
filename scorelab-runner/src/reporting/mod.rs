//! Reporting: console tables, Markdown, JSON and CSV export.

pub mod console;
pub mod export;
pub mod format;
pub mod markdown;
pub mod number;

pub use console::{render_console, render_header, render_load_summary, NO_ENTRIES_MESSAGE};
pub use export::{save_report, SavedPaths};
pub use markdown::render_markdown;
