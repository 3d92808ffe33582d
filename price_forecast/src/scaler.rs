//! Z-score scaling with a fit identity
//!
//! Every call to [`fit_scale`] mints a fresh [`ScalerId`]. The scaled series
//! and everything derived from it carry that id, and [`inverse_scale`] refuses
//! to undo the transform with the state of any other fit.

use crate::data::{PricePoint, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use std::fmt;
use tracing::debug;
use trade_math::stats::{mean, population_std};
use uuid::Uuid;

/// Identity of one scaler fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScalerId(Uuid);

impl ScalerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for ScalerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mean and standard deviation of the series a scaler was fitted on
#[derive(Debug, Clone, PartialEq)]
pub struct ScalerState {
    id: ScalerId,
    mean: f64,
    std: f64,
}

impl ScalerState {
    pub fn id(&self) -> ScalerId {
        self.id
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn std(&self) -> f64 {
        self.std
    }
}

/// Values in the units of one scaler fit
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledSeries {
    id: ScalerId,
    series: PriceSeries,
}

impl ScaledSeries {
    pub fn scaler_id(&self) -> ScalerId {
        self.id
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    pub fn values(&self) -> Vec<f64> {
        self.series.closes()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Tag new values, e.g. model output, as being in the same units as
    /// this series.
    pub fn derive(&self, dates: &[NaiveDate], values: &[f64]) -> Result<ScaledSeries> {
        if dates.len() != values.len() {
            return Err(ForecastError::InvalidParameter(format!(
                "{} dates for {} values",
                dates.len(),
                values.len()
            )));
        }
        let points = dates
            .iter()
            .zip(values)
            .map(|(&date, &close)| PricePoint { date, close })
            .collect();
        Ok(ScaledSeries {
            id: self.id,
            series: PriceSeries::new(self.series.ticker(), points)?,
        })
    }
}

/// Normalise closing prices to zero mean and unit population variance.
pub fn fit_scale(series: &PriceSeries) -> Result<(ScaledSeries, ScalerState)> {
    let closes = series.closes();
    let mu = mean(&closes)?;
    let sigma = population_std(&closes)?;
    if sigma <= 1e-12 * mu.abs().max(1.0) {
        return Err(ForecastError::DegenerateSeries(format!(
            "{} has zero variance over {} observations",
            series.ticker(),
            closes.len()
        )));
    }

    let state = ScalerState {
        id: ScalerId::new(),
        mean: mu,
        std: sigma,
    };
    let points = series
        .points()
        .iter()
        .map(|p| PricePoint {
            date: p.date,
            close: (p.close - mu) / sigma,
        })
        .collect();
    debug!(ticker = series.ticker(), mean = mu, std = sigma, scaler = %state.id, "fitted scaler");

    Ok((
        ScaledSeries {
            id: state.id,
            series: PriceSeries::new(series.ticker(), points)?,
        },
        state,
    ))
}

/// Map scaled values back to prices with `value * std + mean`.
pub fn inverse_scale(state: &ScalerState, scaled: &ScaledSeries) -> Result<PriceSeries> {
    if state.id != scaled.id {
        return Err(ForecastError::ScalerMismatch(format!(
            "series was scaled by {} but state belongs to {}",
            scaled.id, state.id
        )));
    }
    let points = scaled
        .series
        .points()
        .iter()
        .map(|p| PricePoint {
            date: p.date,
            close: p.close * state.std + state.mean,
        })
        .collect();
    PriceSeries::new(scaled.series.ticker(), points)
}
