//! Forecasting models and their dated output

use crate::data::PriceSeries;
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

pub mod arima;

/// One predicted closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Predicted prices on consecutive calendar days
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawForecast")]
pub struct ForecastResult {
    points: Vec<ForecastPoint>,
}

/// Unchecked wire form; deserialized results go through [`ForecastResult::new`]
#[derive(Deserialize)]
struct RawForecast {
    points: Vec<ForecastPoint>,
}

impl TryFrom<RawForecast> for ForecastResult {
    type Error = ForecastError;

    fn try_from(raw: RawForecast) -> Result<Self> {
        Self::new(raw.points)
    }
}

impl ForecastResult {
    /// Create a forecast result; dates must step by exactly one day.
    pub fn new(points: Vec<ForecastPoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::InvalidParameter(
                "Forecast must contain at least one point".to_string(),
            ));
        }
        if let Some(pair) = points
            .windows(2)
            .find(|w| w[0].date.succ_opt() != Some(w[1].date))
        {
            return Err(ForecastError::InvalidParameter(format!(
                "Forecast dates must be consecutive days, found {} after {}",
                pair[1].date, pair[0].date
            )));
        }
        if let Some(point) = points.iter().find(|p| !p.price.is_finite()) {
            return Err(ForecastError::ModelFit(format!(
                "Non-finite forecast on {}",
                point.date
            )));
        }
        Ok(Self { points })
    }

    /// Forecast from a price series already laid out on consecutive days
    pub fn from_series(series: &PriceSeries) -> Result<Self> {
        Self::new(
            series
                .points()
                .iter()
                .map(|p| ForecastPoint {
                    date: p.date,
                    price: p.close,
                })
                .collect(),
        )
    }

    pub fn points(&self) -> &[ForecastPoint] {
        &self.points
    }

    /// Get the forecasted values
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.price).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    /// Get the number of periods forecasted
    pub fn horizon(&self) -> usize {
        self.points.len()
    }

    pub fn first_date(&self) -> NaiveDate {
        self.points[0].date
    }

    pub fn last_date(&self) -> NaiveDate {
        self.points[self.points.len() - 1].date
    }
}

/// Trained forecast model
pub trait TrainedForecastModel: Debug {
    /// Point forecasts for the next `horizon` steps, in the units of the
    /// training data
    fn forecast(&self, horizon: usize) -> Result<Vec<f64>>;

    /// In-sample one-step residuals on the differenced scale
    fn residuals(&self) -> &[f64];

    /// Name of the model
    fn name(&self) -> &str;
}

/// Forecast model that can be trained on a series of values
pub trait ForecastModel: Debug + Clone {
    /// The type of trained model produced
    type Trained: TrainedForecastModel;

    /// Train the model on a series of values
    fn train(&self, data: &[f64]) -> Result<Self::Trained>;

    /// Get the name of the model
    fn name(&self) -> &str;
}
