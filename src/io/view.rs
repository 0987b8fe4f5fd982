//! Read/write dashboard JSON files.
//!
//! A dashboard file is the serialized [`DashboardView`]: product, timeframe,
//! trend headline, anomaly list and the resampled chart. It can be plotted
//! again later without access to the data source.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::app::pipeline::DashboardView;
use crate::error::AppError;

/// Write a dashboard JSON file.
pub fn write_view_json(path: &Path, view: &DashboardView) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::new(2, format!("Failed to create dashboard JSON '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, view)
        .map_err(|e| AppError::new(2, format!("Failed to write dashboard JSON: {e}")))
}

/// Read a dashboard JSON file.
pub fn read_view_json(path: &Path) -> Result<DashboardView, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::new(2, format!("Failed to open dashboard JSON '{}': {e}", path.display())))?;
    let view: DashboardView = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| AppError::new(2, format!("Invalid dashboard JSON '{}': {e}", path.display())))?;

    if view.chart.predicted.len() != view.chart.grid.len() || view.chart.actual.len() != view.chart.grid.len() {
        return Err(AppError::new(
            2,
            format!("Dashboard JSON '{}' has misaligned chart columns.", path.display()),
        ));
    }
    if view.chart.anomaly_grid_indices.iter().any(|&i| i >= view.chart.grid.len()) {
        return Err(AppError::new(
            2,
            format!("Dashboard JSON '{}' has anomaly markers outside the grid.", path.display()),
        ));
    }
    Ok(view)
}
