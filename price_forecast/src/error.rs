//! Error types for the price_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;
use trade_math::MathError;

/// Every way a forecast request can fail
#[derive(Debug, Error, PartialEq)]
pub enum ForecastError {
    /// Unknown ticker, empty result, transport failure or unreadable file
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Series too short for a test or evaluation window
    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    /// Zero-variance or otherwise deterministic series
    #[error("Degenerate series: {0}")]
    DegenerateSeries(String),

    /// Differencing ran out of observations before the series became stationary
    #[error("Series is still non-stationary after {order} differences (p-value {p_value})")]
    NonStationary { order: usize, p_value: f64 },

    /// Model estimation did not converge or is ill-posed
    #[error("Model fit failed: {0}")]
    ModelFit(String),

    /// Inverse scaling attempted with the state of a different fit
    #[error("Scaler mismatch: {0}")]
    ScalerMismatch(String),

    /// Invalid caller-supplied parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<MathError> for ForecastError {
    fn from(err: MathError) -> Self {
        match err {
            MathError::InsufficientData(msg) => ForecastError::InsufficientData(msg),
            MathError::InvalidInput(msg) | MathError::Singular(msg) => ForecastError::ModelFit(msg),
        }
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::DataUnavailable(err.to_string())
    }
}

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::DataUnavailable(err.to_string())
    }
}

impl From<reqwest::Error> for ForecastError {
    fn from(err: reqwest::Error) -> Self {
        ForecastError::DataUnavailable(err.to_string())
    }
}
