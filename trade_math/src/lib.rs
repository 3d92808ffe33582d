//! # Trade Math
//!
//! Numeric kernels behind the price forecasting pipeline.
//! Nothing in this crate knows about tickers or dates; everything works on
//! plain `f64` slices so the domain crate can compose the pieces.
//!
//! - [`stats`]: mean, population standard deviation, RMSE, rounding
//! - [`differencing`]: first differences and their inverse
//! - [`regression`]: ordinary and ridge least squares
//! - [`stationarity`]: augmented Dickey-Fuller unit-root test

use thiserror::Error;

pub mod differencing;
pub mod regression;
pub mod stationarity;
pub mod stats;

/// Errors that can occur in numeric calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MathError {
    #[error("Insufficient data for calculation: {0}")]
    InsufficientData(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Singular system: {0}")]
    Singular(String),
}

/// Result type for numeric operations
pub type Result<T> = std::result::Result<T, MathError>;

/// Reject slices containing NaN or infinite values.
pub(crate) fn ensure_finite(values: &[f64], what: &str) -> Result<()> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(idx) => Err(MathError::InvalidInput(format!(
            "{} contains a non-finite value at index {}",
            what, idx
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finite_check_reports_position() {
        assert!(ensure_finite(&[1.0, 2.0], "series").is_ok());

        let err = ensure_finite(&[1.0, f64::NAN, 3.0], "series").unwrap_err();
        assert_eq!(
            err,
            MathError::InvalidInput("series contains a non-finite value at index 1".to_string())
        );
    }
}
