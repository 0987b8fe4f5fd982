//! Headline trend figure: latest prediction and change from the one before.

use crate::domain::{TimeSeries, TrendSummary};

/// Summarize the tail of the (unfiltered) series.
///
/// A single-point series, or a previous value of zero, yields a change of 0.
pub fn summarize(series: &TimeSeries) -> TrendSummary {
    let predicted = series.predicted();
    let latest = predicted[predicted.len() - 1];
    let previous = if predicted.len() > 1 {
        predicted[predicted.len() - 2]
    } else {
        latest
    };

    let percent_change = if previous != 0.0 {
        (latest - previous) / previous * 100.0
    } else {
        0.0
    };

    TrendSummary {
        latest,
        previous,
        percent_change,
    }
}
