//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory by the selection/resampling engine
//! - exported to JSON/CSV
//! - reloaded later for plotting

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ForecastError;

/// One product's observed and forecast history.
///
/// Invariants (enforced by [`TimeSeries::new`]):
/// - at least one entry
/// - `dates` strictly increasing
/// - `actual` and `predicted` positionally aligned with `dates`, all finite
/// - every anomaly date is one of `dates`
///
/// The series is immutable once built; sub-series are produced as new values.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    dates: Vec<NaiveDate>,
    actual: Vec<f64>,
    predicted: Vec<f64>,
    anomalies: BTreeSet<NaiveDate>,
}

impl TimeSeries {
    pub fn new(
        dates: Vec<NaiveDate>,
        actual: Vec<f64>,
        predicted: Vec<f64>,
        anomalies: impl IntoIterator<Item = NaiveDate>,
    ) -> Result<Self, ForecastError> {
        if dates.is_empty() {
            return Err(ForecastError::InvalidSeries("series has no observations".to_string()));
        }
        if actual.len() != dates.len() || predicted.len() != dates.len() {
            return Err(ForecastError::InvalidSeries(format!(
                "length mismatch: {} dates, {} actual, {} predicted",
                dates.len(),
                actual.len(),
                predicted.len()
            )));
        }
        if let Some(i) = dates.windows(2).position(|w| w[0] >= w[1]) {
            return Err(ForecastError::InvalidSeries(format!(
                "dates must be strictly increasing ({} followed by {})",
                dates[i],
                dates[i + 1]
            )));
        }
        if let Some(i) = actual.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidSeries(format!(
                "non-finite actual value on {}",
                dates[i]
            )));
        }
        if let Some(i) = predicted.iter().position(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidSeries(format!(
                "non-finite predicted value on {}",
                dates[i]
            )));
        }

        let anomalies: BTreeSet<NaiveDate> = anomalies.into_iter().collect();
        if let Some(stray) = anomalies.iter().find(|d| dates.binary_search(d).is_err()) {
            return Err(ForecastError::InvalidSeries(format!(
                "anomaly date {stray} is not one of the series dates"
            )));
        }

        Ok(Self {
            dates,
            actual,
            predicted,
            anomalies,
        })
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn actual(&self) -> &[f64] {
        &self.actual
    }

    pub fn predicted(&self) -> &[f64] {
        &self.predicted
    }

    pub fn anomalies(&self) -> &BTreeSet<NaiveDate> {
        &self.anomalies
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    /// Index of `date` in the series, if present.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.dates.binary_search(&date).ok()
    }

    /// Sub-series of the entries from `start` to the end.
    ///
    /// Anomalies before `start` are dropped so the result keeps `anomalies ⊆ dates`.
    /// Returns `None` when `start` leaves nothing.
    pub fn suffix(&self, start: usize) -> Option<TimeSeries> {
        if start >= self.dates.len() {
            return None;
        }
        let first = self.dates[start];
        Some(Self {
            dates: self.dates[start..].to_vec(),
            actual: self.actual[start..].to_vec(),
            predicted: self.predicted[start..].to_vec(),
            anomalies: self.anomalies.range(first..).copied().collect(),
        })
    }
}

/// User-facing timeframe choice. Labels and rules come from the timeframe table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeframeToken {
    Shortest,
    Short,
    Medium,
    Long,
    All,
}

impl TimeframeToken {
    pub const ALL_TOKENS: [TimeframeToken; 5] = [
        TimeframeToken::Shortest,
        TimeframeToken::Short,
        TimeframeToken::Medium,
        TimeframeToken::Long,
        TimeframeToken::All,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeframeToken::Shortest => "shortest",
            TimeframeToken::Short => "short",
            TimeframeToken::Medium => "medium",
            TimeframeToken::Long => "long",
            TimeframeToken::All => "all",
        }
    }
}

impl std::fmt::Display for TimeframeToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved filtering strategy behind a timeframe token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SelectionRule {
    /// The last `count` entries by position (not by elapsed calendar days).
    TrailingCount { count: usize },
    /// Every entry dated on or after `date`.
    CalendarCutoff { date: NaiveDate },
    /// The whole series.
    All,
}

impl std::fmt::Display for SelectionRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SelectionRule::TrailingCount { count } => write!(f, "last {count} entries"),
            SelectionRule::CalendarCutoff { date } => write!(f, "on or after {date}"),
            SelectionRule::All => f.write_str("all entries"),
        }
    }
}

/// A series re-expressed on a dense daily grid, ready for the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResampledSeries {
    /// Consecutive calendar dates, first/last equal to the source endpoints.
    pub grid: Vec<NaiveDate>,
    pub predicted: Vec<f64>,
    pub actual: Vec<f64>,
    /// Grid positions to mark on the `actual` curve.
    pub anomaly_grid_indices: BTreeSet<usize>,
}

impl ResampledSeries {
    pub fn len(&self) -> usize {
        self.grid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grid.is_empty()
    }
}

/// Headline "latest prediction + percent change" figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendSummary {
    pub latest: f64,
    pub previous: f64,
    pub percent_change: f64,
}

impl TrendSummary {
    /// Zero change counts as up.
    pub fn is_up(&self) -> bool {
        self.percent_change >= 0.0
    }
}
