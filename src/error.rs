use thiserror::Error;

/// Top-level error carried back to `main`, which prints it and exits with `exit_code`.
///
/// Exit codes:
/// - `2`: bad input or configuration
/// - `3`: no usable data
/// - `4`: external or terminal failure
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

/// Failures of the forecast core and its data collaborators.
///
/// A selection rule that matches nothing is not listed here: it is reported
/// as [`crate::engine::selector::SelectionFellBack`] next to the substituted series.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ForecastError {
    /// The timeframe token (or label) is not present in the configured table.
    #[error("Unknown timeframe '{0}'.")]
    UnknownTimeframe(String),

    /// The requested product is absent from the backing store.
    #[error("Product '{0}' not found.")]
    NotFound(String),

    /// The backing store has no products at all.
    #[error("No products available.")]
    EmptyCatalog,

    /// A product record violates the time-series invariants.
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// The timeframe configuration table is malformed.
    #[error("Invalid timeframe table: {0}")]
    InvalidTimeframeTable(String),

    /// The data source could not be reached or returned garbage.
    #[error("Data source error: {0}")]
    Source(String),
}

impl ForecastError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ForecastError::UnknownTimeframe(_) | ForecastError::InvalidTimeframeTable(_) => 2,
            ForecastError::NotFound(_) | ForecastError::EmptyCatalog | ForecastError::InvalidSeries(_) => 3,
            ForecastError::Source(_) => 4,
        }
    }
}

impl From<ForecastError> for AppError {
    fn from(err: ForecastError) -> Self {
        AppError::new(err.exit_code(), err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forecast_errors_map_to_exit_codes() {
        let err: AppError = ForecastError::NotFound("iphone_16_stock".to_string()).into();
        assert_eq!(err.exit_code(), 3);
        assert_eq!(err.message(), "Product 'iphone_16_stock' not found.");

        let err: AppError = ForecastError::UnknownTimeframe("9Y".to_string()).into();
        assert_eq!(err.exit_code(), 2);

        let err: AppError = ForecastError::Source("connection refused".to_string()).into();
        assert_eq!(err.exit_code(), 4);
    }
}
