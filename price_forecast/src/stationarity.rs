//! Stationarity testing and the differencing order search

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use tracing::{debug, info};
use trade_math::differencing::difference;
use trade_math::stationarity::{adf_test, MIN_OBSERVATIONS};
use trade_math::stats::round_to;
use trade_math::MathError;

/// p-value at or below which a series counts as stationary
pub const SIGNIFICANCE: f64 = 0.05;

/// Augmented Dickey-Fuller based stationarity checks
#[derive(Debug, Clone, Copy, Default)]
pub struct StationarityAnalyzer;

impl StationarityAnalyzer {
    pub fn new() -> Self {
        Self
    }

    /// ADF p-value of the closing prices, rounded to 3 decimals
    pub fn stationarity_p_value(&self, series: &PriceSeries) -> Result<f64> {
        p_value(&series.closes())
    }

    /// Number of first differences needed before the ADF test rejects a unit
    /// root at [`SIGNIFICANCE`].
    ///
    /// Each round drops one observation. When too few remain to run the test
    /// again the search stops with [`ForecastError::NonStationary`].
    pub fn differencing_order(&self, series: &PriceSeries) -> Result<usize> {
        let mut current = series.closes();
        let mut order = 0;
        let mut p = p_value(&current)?;

        while p > SIGNIFICANCE {
            if current.len() <= MIN_OBSERVATIONS {
                return Err(ForecastError::NonStationary { order, p_value: p });
            }
            current = difference(&current);
            order += 1;
            p = p_value(&current)?;
            debug!(order, p_value = p, "differenced series");
        }

        info!(
            ticker = series.ticker(),
            order,
            p_value = p,
            "differencing order found"
        );
        Ok(order)
    }
}

fn p_value(values: &[f64]) -> Result<f64> {
    let result = adf_test(values).map_err(|err| match err {
        MathError::InsufficientData(msg) => ForecastError::InsufficientData(msg),
        MathError::InvalidInput(msg) | MathError::Singular(msg) => {
            ForecastError::DegenerateSeries(msg)
        }
    })?;
    Ok(round_to(result.p_value, 3))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn series(values: &[f64]) -> PriceSeries {
        PriceSeries::from_values("TEST", NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(), values)
            .unwrap()
    }

    fn noise(n: usize, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        (0..n).map(|_| normal.sample(&mut rng)).collect()
    }

    #[test]
    fn test_p_value_is_rounded() {
        let p = StationarityAnalyzer::new()
            .stationarity_p_value(&series(&noise(150, 3)))
            .unwrap();
        assert_eq!(p, round_to(p, 3));
        assert!((0.0..=1.0).contains(&p));
    }

    #[test]
    fn test_white_noise_needs_no_differencing() {
        let order = StationarityAnalyzer::new()
            .differencing_order(&series(&noise(200, 11)))
            .unwrap();
        assert_eq!(order, 0);
    }

    #[test]
    fn test_too_short_for_test() {
        let result = StationarityAnalyzer::new().stationarity_p_value(&series(&[1.0, 2.0, 4.0]));
        assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
    }

    #[test]
    fn test_explosive_short_series_hits_cap() {
        let result = StationarityAnalyzer::new()
            .differencing_order(&series(&[1.0, 2.0, 4.0, 8.0, 16.5, 33.0]));
        match result {
            Err(ForecastError::NonStationary { order, p_value }) => {
                assert_eq!(order, 2);
                assert!(p_value > SIGNIFICANCE);
            }
            other => panic!("expected NonStationary, got {:?}", other),
        }
    }

    #[test]
    fn test_constant_series_is_degenerate() {
        let result = StationarityAnalyzer::new().differencing_order(&series(&[5.0; 50]));
        assert!(matches!(result, Err(ForecastError::DegenerateSeries(_))));
    }
}
