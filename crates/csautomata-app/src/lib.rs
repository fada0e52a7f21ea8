//! Headless front end for the csautomata engine.
//!
//! Loads an [`EngineConfig`](csautomata_core::EngineConfig) from flags and/or a
//! JSON file, paces a [`BatchSession`](csautomata_core::BatchSession) by the
//! configured step interval, and writes the collected score series as JSON.

pub mod cli;
pub mod driver;
pub mod sink;

pub use cli::Cli;
pub use driver::{LoggingObserver, drive};
pub use sink::{BatchReport, write_report};
