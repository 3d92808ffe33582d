//! End-to-end forecast for one ticker
//!
//! Strictly sequential: differencing order, scaling, hold-out evaluation, a
//! fit on the full scaled series, the forecast and finally inverse scaling
//! onto calendar days starting today. The first error aborts the run.

use crate::data::PriceSeries;
use crate::error::Result;
use crate::evaluation::{AccuracyScore, Evaluator};
use crate::models::arima::ArimaModel;
use crate::models::{ForecastModel, ForecastResult, TrainedForecastModel};
use crate::scaler::{fit_scale, inverse_scale};
use crate::source::{DateRange, PriceSource};
use crate::stationarity::StationarityAnalyzer;
use crate::utils::forecast_dates;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use tracing::{info, info_span};

/// Number of calendar days forecast
pub const FORECAST_HORIZON: usize = 30;

/// Everything one pipeline run produces
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastOutcome {
    pub ticker: String,
    pub differencing_order: usize,
    pub score: AccuracyScore,
    pub forecast: ForecastResult,
}

/// Runs the forecast for tickers pulled from a [`PriceSource`]
#[derive(Debug)]
pub struct ForecastPipeline<S> {
    source: S,
    history_start: NaiveDate,
    analyzer: StationarityAnalyzer,
    evaluator: Evaluator,
}

impl<S: PriceSource> ForecastPipeline<S> {
    /// Pipeline reading closing prices from `history_start` onwards
    pub fn new(source: S, history_start: NaiveDate) -> Self {
        Self {
            source,
            history_start,
            analyzer: StationarityAnalyzer::new(),
            evaluator: Evaluator::new(),
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Forecast starting at today's local date
    pub fn run(&self, ticker: &str) -> Result<ForecastOutcome> {
        self.run_as_of(ticker, Local::now().date_naive())
    }

    /// Forecast using history up to `today`, dated from `today`
    pub fn run_as_of(&self, ticker: &str, today: NaiveDate) -> Result<ForecastOutcome> {
        let span = info_span!("forecast", ticker, source = self.source.name());
        let _guard = span.enter();

        let range = DateRange::new(self.history_start, today)?;
        let series = self.source.close_prices(ticker, &range)?;
        info!(observations = series.len(), "fetched closing prices");
        self.forecast_series(&series, today)
    }

    /// Forecast an already loaded series
    pub fn forecast_series(
        &self,
        series: &PriceSeries,
        today: NaiveDate,
    ) -> Result<ForecastOutcome> {
        let d = self.analyzer.differencing_order(series)?;
        let (scaled, state) = fit_scale(series)?;
        let values = scaled.values();

        let score = self.evaluator.evaluate(&values, d)?;

        let trained = ArimaModel::daily(d).train(&values)?;
        let predicted = trained.forecast(FORECAST_HORIZON)?;
        let dated = scaled.derive(&forecast_dates(today, FORECAST_HORIZON), &predicted)?;
        let forecast = ForecastResult::from_series(&inverse_scale(&state, &dated)?)?;

        info!(
            ticker = series.ticker(),
            d,
            rmse = score.rmse(),
            first = %forecast.first_date(),
            last = %forecast.last_date(),
            "forecast complete"
        );

        Ok(ForecastOutcome {
            ticker: series.ticker().to_string(),
            differencing_order: d,
            score,
            forecast,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::SyntheticSource;

    #[test]
    fn test_run_as_of_with_synthetic_source() {
        let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 6, 28).unwrap();
        let pipeline = ForecastPipeline::new(SyntheticSource::default(), start);

        let outcome = pipeline.run_as_of("aapl", today).unwrap();

        assert_eq!(outcome.ticker, "AAPL");
        assert_eq!(outcome.forecast.horizon(), FORECAST_HORIZON);
        assert_eq!(outcome.forecast.first_date(), today);
        assert!(outcome.score.rmse() >= 0.0);
    }

    #[test]
    fn test_start_after_today_is_rejected() {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let pipeline = ForecastPipeline::new(SyntheticSource::default(), start);
        assert!(pipeline.run_as_of("AAPL", today).is_err());
    }
}
