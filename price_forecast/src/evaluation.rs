//! Hold-out evaluation of the daily ARIMA model

use crate::error::{ForecastError, Result};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::utils::split_holdout;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;
use trade_math::stats::{root_mean_squared_error, round_to};

/// Trailing observations held out for scoring
pub const HOLDOUT_WINDOW: usize = 30;

/// Root mean squared error over the hold-out window, rounded to 2 decimals
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct AccuracyScore(f64);

impl AccuracyScore {
    /// Score from a raw RMSE, rounded to 2 decimals
    pub fn new(rmse: f64) -> Self {
        Self(round_to(rmse, 2))
    }

    pub fn rmse(&self) -> f64 {
        self.0
    }
}

impl fmt::Display for AccuracyScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

/// Fits on everything but the last [`HOLDOUT_WINDOW`] values and scores the
/// forecast of those values
#[derive(Debug, Clone, Copy, Default)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    pub fn evaluate(&self, values: &[f64], d: usize) -> Result<AccuracyScore> {
        let (train, test) = split_holdout(values, HOLDOUT_WINDOW)?;

        let model = ArimaModel::daily(d);
        let trained = model.train(train)?;
        let predicted = trained.forecast(test.len())?;

        let rmse = root_mean_squared_error(&predicted, test)
            .map_err(|e| ForecastError::ModelFit(e.to_string()))?;
        let score = AccuracyScore::new(rmse);
        info!(
            model = model.name(),
            train = train.len(),
            rmse = score.rmse(),
            "evaluated hold-out"
        );
        Ok(score)
    }
}
