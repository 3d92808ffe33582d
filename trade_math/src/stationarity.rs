//! Augmented Dickey-Fuller unit-root test
//!
//! Regression with a constant term:
//!
//! `dy_t = a + b * y_{t-1} + sum_{i=1..k} g_i * dy_{t-i} + e_t`
//!
//! The null hypothesis is a unit root (`b = 0`); a small p-value means the
//! series is stationary. The lag order `k` is chosen by minimum AIC over a
//! common sample, then the regression is rerun on every row the chosen lag
//! allows.

use crate::differencing::difference;
use crate::regression::{ols, Matrix};
use crate::{ensure_finite, MathError, Result};
use statrs::function::erf::erfc;

/// Fewest observations for which a lag structure exists
pub const MIN_OBSERVATIONS: usize = 4;

/// Outcome of an augmented Dickey-Fuller test
#[derive(Debug, Clone, PartialEq)]
pub struct AdfResult {
    /// t statistic of the lagged level coefficient
    pub statistic: f64,
    /// MacKinnon approximate p-value
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Largest lag considered during selection
    pub max_lag: usize,
    /// Rows in the final regression
    pub nobs: usize,
}

impl AdfResult {
    /// Whether the unit root is rejected at `significance`
    pub fn is_stationary(&self, significance: f64) -> bool {
        self.p_value <= significance
    }
}

/// Largest lag searched for `n` observations: `ceil(12 * (n/100)^(1/4))`,
/// capped so the regression keeps more rows than regressors.
pub fn max_lag_for(n: usize) -> Result<usize> {
    let schwert = (12.0 * (n as f64 / 100.0).powf(0.25)).ceil() as usize;
    let cap = (n / 2).checked_sub(2).ok_or_else(|| {
        MathError::InsufficientData(format!(
            "Unit-root test needs at least {} observations, got {}",
            MIN_OBSERVATIONS, n
        ))
    })?;
    Ok(schwert.min(cap))
}

/// Run the augmented Dickey-Fuller test with a constant and AIC lag selection.
pub fn adf_test(series: &[f64]) -> Result<AdfResult> {
    ensure_finite(series, "series")?;
    let max_lag = max_lag_for(series.len())?;

    let (lo, hi) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    if hi == lo {
        return Err(MathError::InvalidInput(
            "Unit-root test is undefined for a constant series".to_string(),
        ));
    }

    let diff = difference(series);

    let (common_design, common_response) = adf_regression(series, &diff, max_lag)?;
    let mut best: Option<(f64, usize)> = None;
    let mut last_err = None;
    for lag in 0..=max_lag {
        let design = common_design.leading_columns(2 + lag);
        match ols(&design, &common_response) {
            Ok(fit) => {
                let aic = fit.aic();
                if best.map_or(true, |(best_aic, _)| aic < best_aic) {
                    best = Some((aic, lag));
                }
            }
            Err(err) => last_err = Some(err),
        }
    }

    let used_lag = match (best, last_err) {
        (Some((_, lag)), _) => lag,
        (None, Some(err)) => return Err(err),
        (None, None) => {
            return Err(MathError::InsufficientData(
                "No lag order could be evaluated".to_string(),
            ))
        }
    };

    let (design, response) = adf_regression(series, &diff, used_lag)?;
    let fit = ols(&design, &response)?;
    let statistic = fit.t_value(1)?;

    Ok(AdfResult {
        statistic,
        p_value: mackinnon_p_value(statistic),
        used_lag,
        max_lag,
        nobs: fit.nobs(),
    })
}

/// Columns are `[1, y_{t-1}, dy_{t-1}, .., dy_{t-lags}]`. Rows start after
/// `lags` differences, so the leading columns of a wide design give every
/// smaller lag order the same sample.
fn adf_regression(series: &[f64], diff: &[f64], lags: usize) -> Result<(Matrix, Vec<f64>)> {
    let mut design = Matrix::with_columns(2 + lags);
    let mut response = Vec::with_capacity(diff.len().saturating_sub(lags));
    let mut row = vec![0.0; 2 + lags];

    for t in lags..diff.len() {
        row[0] = 1.0;
        row[1] = series[t];
        for i in 1..=lags {
            row[1 + i] = diff[t - i];
        }
        design.push_row(&row)?;
        response.push(diff[t]);
    }

    Ok((design, response))
}

// MacKinnon (2010) response-surface coefficients, one variable, constant term.
const TAU_MAX: f64 = 2.74;
const TAU_MIN: f64 = -18.83;
const TAU_STAR: f64 = -1.61;
const TAU_SMALL_P: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_LARGE_P: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// Approximate p-value of an ADF statistic (constant, no trend).
pub fn mackinnon_p_value(statistic: f64) -> f64 {
    if statistic.is_nan() {
        return f64::NAN;
    }
    if statistic > TAU_MAX {
        return 1.0;
    }
    if statistic < TAU_MIN {
        return 0.0;
    }

    let coefficients: &[f64] = if statistic <= TAU_STAR {
        &TAU_SMALL_P
    } else {
        &TAU_LARGE_P
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * statistic + c);

    standard_normal_cdf(z)
}

fn standard_normal_cdf(z: f64) -> f64 {
    0.5 * erfc(-z / std::f64::consts::SQRT_2)
}
