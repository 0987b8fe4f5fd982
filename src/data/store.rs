//! Product-data store boundary.
//!
//! This module defines **only** the store trait and the wire record shared by
//! the concrete stores. The core queries a store; it never owns the data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::TimeSeries;
use crate::error::ForecastError;

/// Keyed lookup of per-product series.
///
/// Implementations must be `Send + Sync` so fetches can run on a worker thread
/// behind an `Arc<dyn ProductStore>`.
pub trait ProductStore: Send + Sync {
    /// Human-readable name identifying this store (e.g. `"file"`).
    fn name(&self) -> &'static str;

    /// Product identifiers in store order. The first one is the default selection.
    fn list_products(&self) -> Result<Vec<String>, ForecastError>;

    /// The series for one product, or [`ForecastError::NotFound`].
    fn get_series(&self, product: &str) -> Result<TimeSeries, ForecastError>;
}

/// One product as stored in a results document / returned by the HTTP API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub dates: Vec<String>,
    pub actual_sales: Vec<f64>,
    pub predicted_sales: Vec<f64>,
    #[serde(default)]
    pub anomalies: Vec<String>,
}

impl TryFrom<ProductRecord> for TimeSeries {
    type Error = ForecastError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        let dates = record
            .dates
            .iter()
            .map(|s| parse_date(s))
            .collect::<Result<Vec<_>, _>>()?;
        let anomalies = record
            .anomalies
            .iter()
            .map(|s| parse_date(s))
            .collect::<Result<Vec<_>, _>>()?;
        TimeSeries::new(dates, record.actual_sales, record.predicted_sales, anomalies)
    }
}

impl From<&TimeSeries> for ProductRecord {
    fn from(series: &TimeSeries) -> Self {
        Self {
            dates: series.dates().iter().map(|d| d.format(DATE_FMT).to_string()).collect(),
            actual_sales: series.actual().to_vec(),
            predicted_sales: series.predicted().to_vec(),
            anomalies: series.anomalies().iter().map(|d| d.format(DATE_FMT).to_string()).collect(),
        }
    }
}

const DATE_FMT: &str = "%Y-%m-%d";

/// Parse a record date.
///
/// Results files carry ISO dates (`YYYY-MM-DD`), but hand-edited or
/// spreadsheet-exported files often use `YYYY/MM/DD` or `DD/MM/YYYY`, and some
/// exporters append a time of day. We accept that small set deterministically.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ForecastError> {
    const FMTS: [&str; 3] = [DATE_FMT, "%Y/%m/%d", "%d/%m/%Y"];
    let s = raw.trim();
    let s = s.split_once('T').map(|(day, _)| day).unwrap_or(s);
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    Err(ForecastError::InvalidSeries(format!(
        "invalid date '{raw}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY."
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_converts_to_validated_series() {
        let record: ProductRecord = serde_json::from_str(
            r#"{
                "dates": ["2024-12-01", "2024-12-02", "2024-12-03T00:00:00"],
                "actual_sales": [10.0, 12.0, 9.0],
                "predicted_sales": [11.0, 11.5, 10.25],
                "anomalies": ["2024-12-03"]
            }"#,
        )
        .unwrap();

        let series = TimeSeries::try_from(record.clone()).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.last_date(), NaiveDate::from_ymd_opt(2024, 12, 3).unwrap());
        assert_eq!(series.anomalies().len(), 1);

        let back = ProductRecord::from(&series);
        assert_eq!(back.dates[2], "2024-12-03");
        assert_eq!(back.predicted_sales, record.predicted_sales);
    }

    #[test]
    fn missing_anomalies_field_defaults_to_none() {
        let record: ProductRecord =
            serde_json::from_str(r#"{"dates": ["2024-12-01"], "actual_sales": [1.0], "predicted_sales": [2.0]}"#)
                .unwrap();
        let series = TimeSeries::try_from(record).unwrap();
        assert!(series.anomalies().is_empty());
    }

    #[test]
    fn bad_dates_are_invalid_series() {
        assert!(matches!(parse_date("Dec 1"), Err(ForecastError::InvalidSeries(_))));
        assert_eq!(
            parse_date("17/12/2024").unwrap(),
            NaiveDate::from_ymd_opt(2024, 12, 17).unwrap()
        );
    }
}
