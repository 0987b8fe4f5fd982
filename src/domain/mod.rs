//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the validated per-product series (`TimeSeries`)
//! - timeframe tokens and their resolved rules (`TimeframeToken`, `SelectionRule`)
//! - engine outputs (`ResampledSeries`, `TrendSummary`)

pub mod types;

pub use types::*;
