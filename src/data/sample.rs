//! Synthetic product catalog with seeded, reproducible sales series.
//!
//! Used when no results file or API is configured, so the dashboard always has
//! something to show. Each product's series is generated independently from a
//! seed derived from the product id, the run seed and the date range.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use chrono::{Datelike, NaiveDate, Weekday};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::data::store::ProductStore;
use crate::domain::TimeSeries;
use crate::error::ForecastError;

/// Anomalies are flagged where the forecast error exceeds this many standard
/// deviations of the forecast error.
const ANOMALY_SIGMA: f64 = 1.5;

/// Probability of an injected demand spike/drop on a given day.
const JUMP_PROB: f64 = 0.04;

/// Default catalog, in display order.
pub const DEFAULT_PRODUCTS: [&str; 5] = [
    "iphone_16_stock",
    "macbook_air_stock",
    "airpods_pro_stock",
    "apple_watch_stock",
    "ipad_pro_stock",
];

#[derive(Debug, Clone)]
pub struct SampleConfig {
    pub products: Vec<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub seed: u64,
    /// Skip Sundays so the series has calendar gaps.
    pub sparse: bool,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            products: DEFAULT_PRODUCTS.iter().map(|p| p.to_string()).collect(),
            start: NaiveDate::from_ymd_opt(2024, 10, 21).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2024, 12, 31).unwrap_or_default(),
            seed: 42,
            sparse: false,
        }
    }
}

pub struct SampleStore {
    config: SampleConfig,
}

impl SampleStore {
    pub fn new(config: SampleConfig) -> Self {
        Self { config }
    }

    /// Generate every product's series (store order).
    pub fn generate_all(&self) -> Result<Vec<(String, TimeSeries)>, ForecastError> {
        self.config
            .products
            .iter()
            .map(|p| Ok((p.clone(), generate_series(p, &self.config)?)))
            .collect()
    }
}

impl ProductStore for SampleStore {
    fn name(&self) -> &'static str {
        "sample"
    }

    fn list_products(&self) -> Result<Vec<String>, ForecastError> {
        Ok(self.config.products.clone())
    }

    fn get_series(&self, product: &str) -> Result<TimeSeries, ForecastError> {
        if !self.config.products.iter().any(|p| p == product) {
            return Err(ForecastError::NotFound(product.to_string()));
        }
        generate_series(product, &self.config)
    }
}

/// Generate one product's actual/predicted units and flag anomalies.
///
/// Actual units: level + linear trend + weekly seasonality, multiplied by
/// log-normal noise with occasional jumps. Predicted units: an exponentially
/// smoothed copy of the actuals seen so far (the forecast cannot see today's
/// jump), rounded to cents.
pub fn generate_series(product: &str, config: &SampleConfig) -> Result<TimeSeries, ForecastError> {
    if config.end < config.start {
        return Err(ForecastError::InvalidSeries(format!(
            "sample range ends ({}) before it starts ({})",
            config.end, config.start
        )));
    }

    let mut rng = StdRng::seed_from_u64(sample_seed(product, config));
    let noise = Normal::new(0.0, 0.08).map_err(|e| ForecastError::Source(format!("noise distribution error: {e}")))?;

    let level = rng.gen_range(200.0..2_000.0);
    let drift = rng.gen_range(-0.002..0.006) * level;
    let weekly_amp = rng.gen_range(0.05..0.2);

    let dates: Vec<NaiveDate> = config
        .start
        .iter_days()
        .take_while(|d| *d <= config.end)
        .filter(|d| !(config.sparse && d.weekday() == Weekday::Sun))
        .collect();

    let mut actual = Vec::with_capacity(dates.len());
    let mut predicted = Vec::with_capacity(dates.len());
    let mut smoothed: Option<f64> = None;

    for (i, date) in dates.iter().enumerate() {
        let weekday = date.weekday().num_days_from_monday() as f64;
        let seasonal = 1.0 + weekly_amp * (std::f64::consts::TAU * weekday / 7.0).sin();
        let base = (level + drift * i as f64).max(1.0) * seasonal;

        let jump = sample_jump(&mut rng);
        let units = (base * (noise.sample(&mut rng) + jump).exp()).round();

        let forecast = smoothed.unwrap_or(base);
        predicted.push((forecast * 100.0).round() / 100.0);
        actual.push(units);

        smoothed = Some(match smoothed {
            Some(prev) => 0.3 * units + 0.7 * prev,
            None => 0.3 * units + 0.7 * base,
        });
    }

    let anomalies = flag_anomalies(&dates, &actual, &predicted);
    TimeSeries::new(dates, actual, predicted, anomalies)
}

/// Dates where `|actual - predicted|` exceeds [`ANOMALY_SIGMA`] standard
/// deviations of the forecast error.
fn flag_anomalies(dates: &[NaiveDate], actual: &[f64], predicted: &[f64]) -> Vec<NaiveDate> {
    let errors: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
    if errors.len() < 2 {
        return Vec::new();
    }
    let n = errors.len() as f64;
    let mean = errors.iter().sum::<f64>() / n;
    let std = (errors.iter().map(|e| (e - mean).powi(2)).sum::<f64>() / n).sqrt();
    let threshold = ANOMALY_SIGMA * std;

    dates
        .iter()
        .zip(&errors)
        .filter(|(_, e)| e.abs() > threshold)
        .map(|(d, _)| *d)
        .collect()
}

fn sample_jump(rng: &mut StdRng) -> f64 {
    let roll: f64 = rng.r#gen();
    if roll < JUMP_PROB / 2.0 {
        0.6
    } else if roll < JUMP_PROB {
        -0.5
    } else {
        0.0
    }
}

fn sample_seed(product: &str, config: &SampleConfig) -> u64 {
    let mut hasher = DefaultHasher::new();
    product.hash(&mut hasher);
    config.seed.hash(&mut hasher);
    config.start.hash(&mut hasher);
    config.end.hash(&mut hasher);
    hasher.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_generates_valid_series() {
        let store = SampleStore::new(SampleConfig::default());
        let products = store.list_products().unwrap();
        assert_eq!(products.len(), DEFAULT_PRODUCTS.len());

        for (id, series) in store.generate_all().unwrap() {
            // 2024-10-21 ..= 2024-12-31
            assert_eq!(series.len(), 72, "{id}");
            assert!(series.actual().iter().all(|v| *v >= 0.0));
            assert!(series.anomalies().iter().all(|d| series.position(*d).is_some()));
        }
    }

    #[test]
    fn generation_is_reproducible_per_seed() {
        let config = SampleConfig::default();
        let a = generate_series("iphone_16_stock", &config).unwrap();
        let b = generate_series("iphone_16_stock", &config).unwrap();
        assert_eq!(a, b);

        let other = SampleConfig {
            seed: 7,
            ..SampleConfig::default()
        };
        let c = generate_series("iphone_16_stock", &other).unwrap();
        assert_ne!(a.actual(), c.actual());
    }

    #[test]
    fn sparse_mode_skips_sundays() {
        let config = SampleConfig {
            sparse: true,
            ..SampleConfig::default()
        };
        let series = generate_series("ipad_pro_stock", &config).unwrap();
        assert!(series.dates().iter().all(|d| d.weekday() != Weekday::Sun));
        assert!(series.len() < 72);
    }

    #[test]
    fn unknown_product_is_not_found() {
        let store = SampleStore::new(SampleConfig::default());
        assert_eq!(
            store.get_series("pixel_stock"),
            Err(ForecastError::NotFound("pixel_stock".to_string()))
        );
    }

    #[test]
    fn flags_only_large_forecast_errors() {
        let d0 = NaiveDate::from_ymd_opt(2024, 12, 1).unwrap();
        let dates: Vec<NaiveDate> = d0.iter_days().take(6).collect();
        let actual = vec![10.0, 10.0, 10.0, 10.0, 10.0, 40.0];
        let predicted = vec![10.0; 6];
        assert_eq!(flag_anomalies(&dates, &actual, &predicted), vec![dates[5]]);
    }
}
