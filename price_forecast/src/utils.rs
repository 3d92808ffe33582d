//! Utility functions for the price_forecast crate

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;

/// Split values into a training prefix and a trailing hold-out of `holdout`
/// values.
pub fn split_holdout(data: &[f64], holdout: usize) -> Result<(&[f64], &[f64])> {
    if holdout == 0 {
        return Err(ForecastError::InvalidParameter(
            "Hold-out window must be greater than zero".to_string(),
        ));
    }
    if data.len() <= holdout {
        return Err(ForecastError::InsufficientData(format!(
            "Need more than {} observations to hold out {}, got {}",
            holdout,
            holdout,
            data.len()
        )));
    }
    Ok(data.split_at(data.len() - holdout))
}

/// `horizon` consecutive calendar days starting at `start`
pub fn forecast_dates(start: NaiveDate, horizon: usize) -> Vec<NaiveDate> {
    start.iter_days().take(horizon).collect()
}
