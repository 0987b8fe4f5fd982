//! Timeframe selection and resampling engine.
//!
//! Flow for one chart: `timeframe` (token -> rule) -> `selector` (rule ->
//! sub-series) -> `resample` (sub-series -> daily grid) -> `anomaly`
//! (source anomaly dates -> grid indices). `trend` runs separately on the
//! unfiltered series.
//!
//! Everything here is a pure function over immutable inputs.

pub mod anomaly;
pub mod resample;
pub mod selector;
pub mod timeframe;
pub mod trend;

pub use anomaly::project;
pub use resample::resample;
pub use selector::{Selection, SelectionFellBack, select};
pub use timeframe::{TimeframeEntry, TimeframeTable};
pub use trend::summarize;
