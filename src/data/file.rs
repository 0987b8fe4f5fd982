//! Results-file store.
//!
//! The file is a JSON object keyed by product identifier, one
//! [`ProductRecord`] per key. It is re-read on every call so a refreshed
//! results file is picked up by a running session.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::debug;

use crate::data::store::{ProductRecord, ProductStore};
use crate::domain::TimeSeries;
use crate::error::ForecastError;

/// Default location of the results file, relative to the working directory.
pub const DEFAULT_RESULTS_PATH: &str = "public/data/all_results.json";

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_document(&self) -> Result<Map<String, Value>, ForecastError> {
        if !self.path.exists() {
            return Err(ForecastError::Source(format!(
                "results file '{}' not found",
                self.path.display()
            )));
        }
        let file = File::open(&self.path)
            .map_err(|e| ForecastError::Source(format!("failed to open '{}': {e}", self.path.display())))?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ForecastError::Source(format!("invalid results file '{}': {e}", self.path.display())))
    }
}

impl ProductStore for JsonFileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    fn list_products(&self) -> Result<Vec<String>, ForecastError> {
        let doc = self.read_document()?;
        debug!(path = %self.path.display(), products = doc.len(), "listed products");
        Ok(doc.keys().cloned().collect())
    }

    fn get_series(&self, product: &str) -> Result<TimeSeries, ForecastError> {
        let mut doc = self.read_document()?;
        let value = doc
            .remove(product)
            .ok_or_else(|| ForecastError::NotFound(product.to_string()))?;
        let record: ProductRecord = serde_json::from_value(value)
            .map_err(|e| ForecastError::InvalidSeries(format!("{product}: {e}")))?;
        TimeSeries::try_from(record)
    }
}

/// Write a results document (used by `sf generate` and tests).
pub fn write_results(path: &Path, products: &[(String, TimeSeries)]) -> Result<(), ForecastError> {
    let mut doc = Map::new();
    for (id, series) in products {
        let value = serde_json::to_value(ProductRecord::from(series))
            .map_err(|e| ForecastError::Source(format!("failed to encode '{id}': {e}")))?;
        doc.insert(id.clone(), value);
    }
    let file = File::create(path)
        .map_err(|e| ForecastError::Source(format!("failed to create '{}': {e}", path.display())))?;
    serde_json::to_writer_pretty(file, &doc)
        .map_err(|e| ForecastError::Source(format!("failed to write '{}': {e}", path.display())))
}
