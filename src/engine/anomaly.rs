//! Anomaly projection from source positions to grid positions.

use std::collections::BTreeSet;

use crate::domain::{ResampledSeries, TimeSeries};

/// Map each anomaly of `series` to a position in `resampled.grid`.
///
/// An anomaly at source index `j` lands on `round(j * N / M)`, clamped to the
/// grid. Anomaly dates missing from `series` are skipped.
pub fn project(series: &TimeSeries, resampled: &ResampledSeries) -> BTreeSet<usize> {
    let m = series.len();
    let n = resampled.grid.len();
    if n == 0 {
        return BTreeSet::new();
    }

    series
        .anomalies()
        .iter()
        .filter_map(|date| series.position(*date))
        .map(|j| {
            let idx = ((j * n) as f64 / m as f64).round() as usize;
            idx.min(n - 1)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::resample::resample;
    use chrono::{Duration, NaiveDate};

    #[test]
    fn dense_series_maps_anomalies_to_their_own_dates() {
        let d0 = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..6).map(|i| d0 + Duration::days(i)).collect();
        let s = TimeSeries::new(dates.clone(), vec![1.0; 6], vec![1.0; 6], [dates[1], dates[5]]).unwrap();
        let r = resample(&s);

        let idx = project(&s, &r);
        assert_eq!(idx.into_iter().collect::<Vec<_>>(), vec![1, 5]);
    }

    #[test]
    fn sparse_series_scales_and_clamps() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        // 3 entries over 9 days: M = 3, N = 9.
        let dates = vec![d0, d0 + Duration::days(4), d0 + Duration::days(8)];
        let s = TimeSeries::new(dates.clone(), vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0], dates.clone()).unwrap();
        let r = resample(&s);

        let idx = project(&s, &r);
        // j = 0 -> 0, j = 1 -> 3, j = 2 -> 6
        assert_eq!(idx.into_iter().collect::<Vec<_>>(), vec![0, 3, 6]);
    }

    #[test]
    fn projected_indices_stay_in_range() {
        let d0 = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..7).map(|i| d0 + Duration::days(i * 2)).collect();
        let s = TimeSeries::new(dates.clone(), vec![0.0; 7], vec![0.0; 7], dates.clone()).unwrap();
        let r = resample(&s);

        let idx = project(&s, &r);
        assert!(idx.iter().all(|&i| i < r.grid.len()));
        assert_eq!(idx.len(), 7);
    }
}
