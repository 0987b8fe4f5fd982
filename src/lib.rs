//! `sales-forecast` library crate.
//!
//! The binary (`sf`) is a thin wrapper around this library so that:
//!
//! - the timeframe/resampling engine is testable without spawning processes
//! - the same pipeline backs both the CLI report and the TUI dashboard

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod engine;
pub mod error;
pub mod io;
pub mod logging;
pub mod plot;
pub mod report;
pub mod tui;
