//! Export chart data to CSV.
//!
//! One row per grid date, meant for spreadsheets or downstream scripts.

use std::path::Path;

use serde::Serialize;

use crate::domain::ResampledSeries;
use crate::error::AppError;

#[derive(Debug, Serialize)]
struct ChartRow {
    date: String,
    predicted: f64,
    actual: f64,
    anomaly: bool,
}

/// Write `date,predicted,actual,anomaly` rows for a resampled chart.
pub fn write_chart_csv(path: &Path, chart: &ResampledSeries) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::new(2, format!("Failed to create export CSV '{}': {e}", path.display())))?;

    for (i, date) in chart.grid.iter().enumerate() {
        writer
            .serialize(ChartRow {
                date: date.to_string(),
                predicted: chart.predicted[i],
                actual: chart.actual[i],
                anomaly: chart.anomaly_grid_indices.contains(&i),
            })
            .map_err(|e| AppError::new(2, format!("Failed to write export CSV row: {e}")))?;
    }

    writer
        .flush()
        .map_err(|e| AppError::new(2, format!("Failed to flush export CSV: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    #[test]
    fn writes_header_and_rows() {
        let d0 = NaiveDate::from_ymd_opt(2024, 12, 30).unwrap();
        let chart = ResampledSeries {
            grid: d0.iter_days().take(2).collect(),
            predicted: vec![10.5, 11.0],
            actual: vec![9.0, 14.0],
            anomaly_grid_indices: BTreeSet::from([1]),
        };
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chart.csv");
        write_chart_csv(&path, &chart).unwrap();

        let txt = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            txt,
            "date,predicted,actual,anomaly\n2024-12-30,10.5,9.0,false\n2024-12-31,11.0,14.0,true\n"
        );
    }
}
