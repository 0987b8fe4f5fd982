//! Shared dashboard pipeline used by both CLI and TUI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! token -> rule -> selection -> resample -> anomaly projection, plus the
//! trend headline from the unfiltered series.
//!
//! The three displayed outputs (trend, anomaly list, chart) are always
//! computed together from one `TimeSeries`, so a caller either has a complete
//! `DashboardView` or nothing.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{ResampledSeries, TimeSeries, TimeframeToken, TrendSummary};
use crate::engine::{SelectionFellBack, TimeframeTable, project, resample, select, summarize};

/// Everything the renderer needs for one product + timeframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardView {
    pub product: String,
    pub token: TimeframeToken,
    pub timeframe_label: String,
    /// Headline figure from the unfiltered series.
    pub trend: TrendSummary,
    /// Anomaly dates of the unfiltered series.
    pub anomalies: Vec<NaiveDate>,
    /// Chart data for the selected window (markers in `anomaly_grid_indices`).
    pub chart: ResampledSeries,
    /// Set when the timeframe matched nothing and the full series is charted.
    pub fell_back: Option<SelectionFellBack>,
}

/// Compute the dashboard for one series and timeframe.
pub fn build_dashboard(
    product: &str,
    series: &TimeSeries,
    table: &TimeframeTable,
    token: TimeframeToken,
) -> DashboardView {
    let rule = table.resolve_or_all(token);
    let selection = select(series, rule);

    let mut chart = resample(&selection.series);
    chart.anomaly_grid_indices = project(&selection.series, &chart);

    debug!(
        product,
        %token,
        selected = selection.series.len(),
        grid = chart.grid.len(),
        markers = chart.anomaly_grid_indices.len(),
        "built dashboard"
    );

    DashboardView {
        product: product.to_string(),
        token,
        timeframe_label: table.label(token).to_string(),
        trend: summarize(series),
        anomalies: series.anomalies().iter().copied().collect(),
        chart,
        fell_back: selection.fell_back,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SelectionRule;
    use crate::engine::TimeframeEntry;
    use chrono::Duration;

    fn ten_day_series() -> TimeSeries {
        let d0 = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let dates: Vec<NaiveDate> = (0..10).map(|i| d0 + Duration::days(i)).collect();
        let actual: Vec<f64> = (1..=10).map(|i| (i * 10) as f64).collect();
        let predicted: Vec<f64> = actual.iter().map(|v| v + 5.0).collect();
        TimeSeries::new(dates.clone(), actual, predicted, [dates[3], dates[8]]).unwrap()
    }

    fn table(rule: SelectionRule) -> TimeframeTable {
        TimeframeTable::new(vec![TimeframeEntry {
            token: TimeframeToken::Shortest,
            label: "5D".to_string(),
            rule,
        }])
        .unwrap()
    }

    #[test]
    fn trailing_window_charts_suffix_and_drops_outside_anomalies() {
        let s = ten_day_series();
        let view = build_dashboard(
            "mac_stock",
            &s,
            &table(SelectionRule::TrailingCount { count: 5 }),
            TimeframeToken::Shortest,
        );

        assert_eq!(view.chart.grid, s.dates()[5..].to_vec());
        assert_eq!(view.chart.actual, vec![60.0, 70.0, 80.0, 90.0, 100.0]);
        assert_eq!(view.chart.predicted, vec![65.0, 75.0, 85.0, 95.0, 105.0]);
        // D9 is index 3 of the D6..D10 grid; D4 is outside the window.
        assert_eq!(view.chart.anomaly_grid_indices.iter().copied().collect::<Vec<_>>(), vec![3]);
        assert!(view.fell_back.is_none());

        // Headline and anomaly list ignore the window.
        assert_eq!(view.trend.latest, 105.0);
        assert_eq!(view.anomalies.len(), 2);
    }

    #[test]
    fn unknown_token_charts_everything() {
        let s = ten_day_series();
        let view = build_dashboard(
            "mac_stock",
            &s,
            &table(SelectionRule::TrailingCount { count: 5 }),
            TimeframeToken::Long,
        );
        assert_eq!(view.chart.grid.len(), 10);
        assert_eq!(view.timeframe_label, "long");
        assert!(view.fell_back.is_none());
    }

    #[test]
    fn stale_cutoff_falls_back_to_full_series() {
        let s = ten_day_series();
        let rule = SelectionRule::CalendarCutoff {
            date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        let view = build_dashboard("mac_stock", &s, &table(rule), TimeframeToken::Shortest);
        assert_eq!(view.chart.grid, s.dates().to_vec());
        assert_eq!(view.fell_back.map(|f| f.substituted), Some(10));
        assert_eq!(view.chart.anomaly_grid_indices.len(), 2);
    }
}
