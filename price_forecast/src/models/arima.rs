//! ARIMA models for time series forecasting
//!
//! Coefficients come from an iterated Hannan-Rissanen procedure on the
//! differenced series:
//!
//! 1. a long autoregression gives first estimates of the innovations,
//! 2. the series is regressed on its own lags and the lagged innovations,
//! 3. innovations are recomputed recursively from the fitted equation and
//!    step 2 repeats while the conditional sum of squares keeps falling.
//!
//! Pre-sample values are zero and every regression carries a small ridge
//! penalty, so high orders stay estimable on short series.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use tracing::debug;
use trade_math::differencing::{difference_n, Differenced};
use trade_math::regression::{ridge, Matrix};
use trade_math::stats::mean;

/// Autoregressive order of the daily model
pub const AR_ORDER: usize = 30;
/// Moving-average order of the daily model
pub const MA_ORDER: usize = 30;

const RIDGE_PENALTY: f64 = 1e-4;
const MAX_REFINEMENTS: usize = 10;
const REFINEMENT_TOLERANCE: f64 = 1e-6;
/// Recursive residuals beyond this multiple of the long-AR residuals mean the
/// MA polynomial is not invertible and the long-AR residuals are kept
const EXPLOSION_RATIO: f64 = 10.0;

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// AR order (p)
    p: usize,
    /// Differencing order (d)
    d: usize,
    /// MA order (q)
    q: usize,
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct TrainedArimaModel {
    name: String,
    /// Mean of the differenced series; zero unless `d == 0`
    mean: f64,
    ar_coefficients: Vec<f64>,
    ma_coefficients: Vec<f64>,
    /// Differenced, demeaned training values
    centered: Vec<f64>,
    /// One-step residuals aligned with `centered`
    residuals: Vec<f64>,
    differenced: Differenced,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self {
            name: format!("ARIMA({},{},{})", p, d, q),
            p,
            d,
            q,
        }
    }

    /// ARIMA(30, d, 30), the fixed daily-price model
    pub fn daily(d: usize) -> Self {
        Self::new(AR_ORDER, d, MA_ORDER)
    }

    pub fn orders(&self) -> (usize, usize, usize) {
        (self.p, self.d, self.q)
    }

    /// Regress `w_t` on `p` lags of `w` and `q` lags of `shocks`
    fn arma_regression(&self, w: &[f64], shocks: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        let mut design = Matrix::with_columns(self.p + self.q);
        let mut row = vec![0.0; self.p + self.q];
        for t in 0..w.len() {
            for i in 0..self.p {
                row[i] = lagged(w, t, i + 1);
            }
            for j in 0..self.q {
                row[self.p + j] = lagged(shocks, t, j + 1);
            }
            design.push_row(&row)?;
        }
        let mut beta = ridge(&design, w, RIDGE_PENALTY)?;
        let ma = beta.split_off(self.p);
        Ok((beta, ma))
    }
}

impl ForecastModel for ArimaModel {
    type Trained = TrainedArimaModel;

    fn train(&self, data: &[f64]) -> Result<TrainedArimaModel> {
        if data.len() < self.d + 2 {
            return Err(ForecastError::ModelFit(format!(
                "{} needs at least {} observations, got {}",
                self.name,
                self.d + 2,
                data.len()
            )));
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "{} cannot be fitted to non-finite values",
                self.name
            )));
        }

        let differenced = difference_n(data, self.d)?;
        let mu = if self.d == 0 {
            mean(&differenced.values)?
        } else {
            0.0
        };
        let w: Vec<f64> = differenced.values.iter().map(|v| v - mu).collect();

        let innovations = long_ar_innovations(&w, self.p + self.q)?;
        let innovation_css = sum_squares(&innovations);

        let (mut ar, mut ma) = self.arma_regression(&w, &innovations)?;
        let mut residuals = recursive_residuals(&w, &ar, &ma);
        let mut css = sum_squares(&residuals);

        for round in 0..MAX_REFINEMENTS {
            if !css.is_finite() {
                break;
            }
            let (next_ar, next_ma) = self.arma_regression(&w, &residuals)?;
            let next_residuals = recursive_residuals(&w, &next_ar, &next_ma);
            let next_css = sum_squares(&next_residuals);
            if !(next_css < css) {
                break;
            }
            let improvement = (css - next_css) / css.max(f64::MIN_POSITIVE);
            ar = next_ar;
            ma = next_ma;
            residuals = next_residuals;
            css = next_css;
            debug!(round, css, "refined arma coefficients");
            if improvement < REFINEMENT_TOLERANCE {
                break;
            }
        }

        if !(css.is_finite() && css <= EXPLOSION_RATIO * innovation_css.max(f64::MIN_POSITIVE)) {
            debug!(css, innovation_css, "unstable ma recursion, keeping long-ar");
            residuals = innovations;
        }

        if ar.iter().chain(ma.iter()).any(|c| !c.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "{} produced non-finite coefficients",
                self.name
            )));
        }

        debug!(
            model = %self.name,
            nobs = w.len(),
            mean = mu,
            css = sum_squares(&residuals),
            "fitted arima"
        );

        Ok(TrainedArimaModel {
            name: self.name.clone(),
            mean: mu,
            ar_coefficients: ar,
            ma_coefficients: ma,
            centered: w,
            residuals,
            differenced,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

impl TrainedArimaModel {
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar_coefficients
    }

    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma_coefficients
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }
}

impl TrainedForecastModel for TrainedArimaModel {
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>> {
        if horizon == 0 {
            return Err(ForecastError::InvalidParameter(
                "Forecast horizon must be greater than zero".to_string(),
            ));
        }

        let mut history = self.centered.clone();
        let mut shocks = self.residuals.clone();
        let mut steps = Vec::with_capacity(horizon);
        for _ in 0..horizon {
            let t = history.len();
            let value = arma_prediction(
                &history,
                &shocks,
                t,
                &self.ar_coefficients,
                &self.ma_coefficients,
            );
            history.push(value);
            // future innovations have zero expectation
            shocks.push(0.0);
            steps.push(value + self.mean);
        }

        let forecast = self.differenced.integrate(&steps);
        if forecast.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "{} forecast diverged",
                self.name
            )));
        }
        Ok(forecast)
    }

    fn residuals(&self) -> &[f64] {
        &self.residuals
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// `values[t - lag]`, or zero before the sample starts
fn lagged(values: &[f64], t: usize, lag: usize) -> f64 {
    t.checked_sub(lag).map_or(0.0, |i| values[i])
}

fn arma_prediction(w: &[f64], shocks: &[f64], t: usize, ar: &[f64], ma: &[f64]) -> f64 {
    let ar_part: f64 = ar
        .iter()
        .enumerate()
        .map(|(i, phi)| phi * lagged(w, t, i + 1))
        .sum();
    let ma_part: f64 = ma
        .iter()
        .enumerate()
        .map(|(j, theta)| theta * lagged(shocks, t, j + 1))
        .sum();
    ar_part + ma_part
}

/// Residuals of a long autoregression, used as first innovation estimates
fn long_ar_innovations(w: &[f64], order: usize) -> Result<Vec<f64>> {
    let order = order.min(w.len() - 1).max(1);
    let mut design = Matrix::with_columns(order);
    let mut row = vec![0.0; order];
    for t in 0..w.len() {
        for (i, slot) in row.iter_mut().enumerate() {
            *slot = lagged(w, t, i + 1);
        }
        design.push_row(&row)?;
    }
    let beta = ridge(&design, w, RIDGE_PENALTY)?;
    Ok((0..w.len())
        .map(|t| w[t] - arma_prediction(w, &[], t, &beta, &[]))
        .collect())
}

/// Residuals obtained by running the ARMA equation forward from zero
/// pre-sample values
fn recursive_residuals(w: &[f64], ar: &[f64], ma: &[f64]) -> Vec<f64> {
    let mut residuals = Vec::with_capacity(w.len());
    for t in 0..w.len() {
        let predicted = arma_prediction(w, &residuals, t, ar, ma);
        residuals.push(w[t] - predicted);
    }
    residuals
}

fn sum_squares(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}
