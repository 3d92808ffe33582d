//! Descriptive statistics and error measures

use crate::{ensure_finite, MathError, Result};

/// Arithmetic mean of a non-empty slice
pub fn mean(values: &[f64]) -> Result<f64> {
    if values.is_empty() {
        return Err(MathError::InsufficientData(
            "Mean requires at least one value".to_string(),
        ));
    }
    Ok(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (divides by `n`, not `n - 1`)
pub fn population_std(values: &[f64]) -> Result<f64> {
    let mu = mean(values)?;
    let variance = values.iter().map(|v| (v - mu).powi(2)).sum::<f64>() / values.len() as f64;
    Ok(variance.sqrt())
}

/// Root mean squared error between predictions and actual values
pub fn root_mean_squared_error(predicted: &[f64], actual: &[f64]) -> Result<f64> {
    if predicted.len() != actual.len() {
        return Err(MathError::InvalidInput(format!(
            "Predicted length ({}) doesn't match actual length ({})",
            predicted.len(),
            actual.len()
        )));
    }
    if predicted.is_empty() {
        return Err(MathError::InsufficientData(
            "RMSE requires at least one pair of values".to_string(),
        ));
    }
    ensure_finite(predicted, "predictions")?;
    ensure_finite(actual, "actual values")?;

    let mse = predicted
        .iter()
        .zip(actual)
        .map(|(p, a)| (p - a).powi(2))
        .sum::<f64>()
        / predicted.len() as f64;

    Ok(mse.sqrt())
}

/// Round half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

/// Trailing rolling mean; the first `window - 1` undefined positions are dropped.
pub fn rolling_mean(values: &[f64], window: usize) -> Result<Vec<f64>> {
    if window == 0 {
        return Err(MathError::InvalidInput(
            "Rolling window must be greater than zero".to_string(),
        ));
    }
    if values.len() < window {
        return Ok(Vec::new());
    }

    let mut sum: f64 = values[..window].iter().sum();
    let mut out = Vec::with_capacity(values.len() - window + 1);
    out.push(sum / window as f64);

    for i in window..values.len() {
        sum += values[i] - values[i - window];
        out.push(sum / window as f64);
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(population_std(&values).unwrap(), 2.0);

        assert!(mean(&[]).is_err());
        assert!(population_std(&[]).is_err());
    }

    #[test]
    fn test_rmse() {
        let actual = [10.0, 20.0, 30.0, 40.0, 50.0];
        let predicted = [12.0, 18.0, 33.0, 37.0, 52.0];
        assert_relative_eq!(
            root_mean_squared_error(&predicted, &actual).unwrap(),
            6f64.sqrt(),
            epsilon = 1e-12
        );

        assert!(root_mean_squared_error(&[1.0], &[1.0, 2.0]).is_err());
        assert!(root_mean_squared_error(&[], &[]).is_err());
        assert!(root_mean_squared_error(&[f64::NAN], &[1.0]).is_err());
    }

    #[test]
    fn test_round_to() {
        assert_eq!(round_to(0.123456, 3), 0.123);
        assert_eq!(round_to(1.005_1, 2), 1.01);
        assert_eq!(round_to(-2.345_6, 2), -2.35);
    }

    #[test]
    fn test_rolling_mean() {
        let values = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let rolled = rolling_mean(&values, 7).unwrap();
        assert_eq!(rolled, vec![4.0, 5.0]);

        assert!(rolling_mean(&values[..3], 7).unwrap().is_empty());
        assert!(rolling_mean(&values, 0).is_err());
    }
}
