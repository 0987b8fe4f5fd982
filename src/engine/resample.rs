//! Calendar resampling onto a dense daily grid.
//!
//! The grid runs from the first to the last source date, one day per step.
//! Values are placed by *proportional index*, not by date distance: grid
//! position `i` reads source position `p = i * M / N` (`M` source entries,
//! `N` grid days) and blends the two bracketing source values linearly.
//! This assumes roughly even spacing of the source observations inside the
//! window. Existing charts depend on these exact values, so the mapping must
//! not be swapped for date-weighted interpolation.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::debug;

use crate::domain::{ResampledSeries, TimeSeries};

/// Resample a series onto a gap-free daily grid.
///
/// The returned `anomaly_grid_indices` is empty; see [`crate::engine::anomaly::project`].
pub fn resample(series: &TimeSeries) -> ResampledSeries {
    let grid = daily_grid(series.first_date(), series.last_date());
    let n = grid.len();

    debug!(source = series.len(), grid = n, "resampling onto daily grid");

    ResampledSeries {
        predicted: interpolate(series.predicted(), n),
        actual: interpolate(series.actual(), n),
        grid,
        anomaly_grid_indices: BTreeSet::new(),
    }
}

/// Every calendar date from `first` to `last`, inclusive.
fn daily_grid(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    first.iter_days().take_while(|d| *d <= last).collect()
}

/// Proportional-index linear interpolation of `values` onto `n` slots.
fn interpolate(values: &[f64], n: usize) -> Vec<f64> {
    let m = values.len();
    let mut out = Vec::with_capacity(n);

    for i in 0..n {
        let p = (i * m) as f64 / n as f64;
        let lo = (p.floor() as usize).min(m - 1);
        let hi = (lo + 1).min(m - 1);
        let frac = p - lo as f64;

        let v = if lo == hi {
            values[lo]
        } else {
            values[lo] + frac * (values[hi] - values[lo])
        };
        out.push(v);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::Duration;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn dense_daily_series_is_identity() {
        let d0 = d(2024, 12, 6);
        let dates: Vec<NaiveDate> = (0..5).map(|i| d0 + Duration::days(i)).collect();
        let actual = vec![60.0, 70.0, 80.0, 90.0, 100.0];
        let predicted = vec![65.0, 75.0, 85.0, 95.0, 105.0];
        let s = TimeSeries::new(dates.clone(), actual.clone(), predicted.clone(), []).unwrap();

        let r = resample(&s);
        assert_eq!(r.grid, dates);
        assert_eq!(r.actual, actual);
        assert_eq!(r.predicted, predicted);
        assert!(r.anomaly_grid_indices.is_empty());
    }

    #[test]
    fn grid_spans_endpoints_across_month_boundary() {
        let s = TimeSeries::new(
            vec![d(2024, 11, 29), d(2024, 12, 2), d(2024, 12, 3)],
            vec![1.0, 2.0, 3.0],
            vec![1.0, 2.0, 3.0],
            [],
        )
        .unwrap();

        let r = resample(&s);
        assert_eq!(r.grid.len(), 5);
        assert_eq!(r.grid[0], s.first_date());
        assert_eq!(*r.grid.last().unwrap(), s.last_date());
        assert_eq!(r.grid[2], d(2024, 12, 1));
        assert_eq!(r.predicted.len(), r.grid.len());
        assert_eq!(r.actual.len(), r.grid.len());
    }

    #[test]
    fn sparse_series_blends_by_proportional_index() {
        // Two observations four days apart: M = 2, N = 5.
        let s = TimeSeries::new(
            vec![d(2024, 1, 1), d(2024, 1, 5)],
            vec![10.0, 20.0],
            vec![0.0, 100.0],
            [],
        )
        .unwrap();

        let r = resample(&s);
        // p = 0, 0.4, 0.8, 1.2, 1.6 -> lo = 0,0,0,1,1
        assert_relative_eq!(r.actual[0], 10.0, epsilon = 1e-9);
        assert_relative_eq!(r.actual[1], 14.0, epsilon = 1e-9);
        assert_relative_eq!(r.actual[2], 18.0, epsilon = 1e-9);
        assert_relative_eq!(r.actual[3], 20.0, epsilon = 1e-9);
        assert_relative_eq!(r.actual[4], 20.0, epsilon = 1e-9);
        assert_relative_eq!(r.predicted[1], 40.0, epsilon = 1e-9);
        assert_relative_eq!(r.predicted[2], 80.0, epsilon = 1e-9);
    }

    #[test]
    fn single_point_series_is_one_grid_day() {
        let s = TimeSeries::new(vec![d(2024, 3, 1)], vec![7.0], vec![8.0], []).unwrap();
        let r = resample(&s);
        assert_eq!(r.grid, vec![d(2024, 3, 1)]);
        assert_eq!(r.actual, vec![7.0]);
        assert_eq!(r.predicted, vec![8.0]);
    }

    #[test]
    fn lengths_always_match_grid() {
        let d0 = d(2024, 1, 1);
        // Every third day.
        let dates: Vec<NaiveDate> = (0..20).map(|i| d0 + Duration::days(i * 3)).collect();
        let values: Vec<f64> = (0..20).map(|i| i as f64).collect();
        let s = TimeSeries::new(dates, values.clone(), values, []).unwrap();

        let r = resample(&s);
        assert_eq!(r.grid.len(), 58);
        assert_eq!(r.grid.len(), r.actual.len());
        assert_eq!(r.grid.len(), r.predicted.len());
        assert!(r.grid.windows(2).all(|w| w[1] - w[0] == Duration::days(1)));
    }
}
