//! HTTP product API integration.
//!
//! Endpoints:
//! - `GET {base}/api/products` -> `{"products": ["id", ...]}`
//! - `GET {base}/api/product/{id}` -> [`ProductRecord`] (404 when unknown)

use reqwest::StatusCode;
use reqwest::Url;
use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::info;

use crate::data::store::{ProductRecord, ProductStore};
use crate::domain::TimeSeries;
use crate::error::{AppError, ForecastError};

/// Environment variable holding the API base URL.
pub const API_URL_ENV: &str = "SF_API_URL";

pub struct HttpStore {
    client: Client,
    base_url: Url,
}

impl HttpStore {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| AppError::new(2, format!("Invalid API URL '{base_url}': {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::new(2, format!("API URL '{base_url}' cannot be used as a base.")));
        }
        Ok(Self {
            client: Client::new(),
            base_url,
        })
    }

    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base_url = std::env::var(API_URL_ENV)
            .map_err(|_| AppError::new(2, format!("Missing {API_URL_ENV} in environment (.env).")))?;
        Self::new(&base_url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ForecastError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ForecastError::Source(format!("API URL '{}' cannot be a base", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn get(&self, url: Url) -> Result<reqwest::blocking::Response, ForecastError> {
        info!(%url, "fetching");
        self.client
            .get(url)
            .send()
            .map_err(|e| ForecastError::Source(format!("request failed: {e}")))
    }
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    products: Vec<String>,
}

impl ProductStore for HttpStore {
    fn name(&self) -> &'static str {
        "http"
    }

    fn list_products(&self) -> Result<Vec<String>, ForecastError> {
        let resp = self.get(self.endpoint(&["api", "products"])?)?;
        if !resp.status().is_success() {
            return Err(ForecastError::Source(format!(
                "product list request failed with status {}",
                resp.status()
            )));
        }
        let body: ProductsResponse = resp
            .json()
            .map_err(|e| ForecastError::Source(format!("failed to parse product list: {e}")))?;
        Ok(body.products)
    }

    fn get_series(&self, product: &str) -> Result<TimeSeries, ForecastError> {
        let resp = self.get(self.endpoint(&["api", "product", product])?)?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Err(ForecastError::NotFound(product.to_string()));
        }
        if !resp.status().is_success() {
            return Err(ForecastError::Source(format!(
                "product request failed with status {}",
                resp.status()
            )));
        }
        let record: ProductRecord = resp
            .json()
            .map_err(|e| ForecastError::Source(format!("failed to parse product '{product}': {e}")))?;
        TimeSeries::try_from(record)
    }
}
