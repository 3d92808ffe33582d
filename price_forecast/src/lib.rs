//! # Price Forecast
//!
//! Near-term closing price forecasts from daily price history.
//!
//! ## Features
//!
//! - Daily price data: closing-price series and OHLC bars, loaded from CSV
//!   with polars or fetched from Yahoo Finance
//! - Stationarity testing and differencing order search (augmented
//!   Dickey-Fuller)
//! - Z-score scaling whose state can only invert its own fit
//! - ARIMA(30, d, 30) fitting and forecasting
//! - Hold-out evaluation by RMSE over the last 30 observations
//!
//! ## Quick Start
//!
//! ```no_run
//! use chrono::NaiveDate;
//! use price_forecast::source::SyntheticSource;
//! use price_forecast::ForecastPipeline;
//!
//! let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
//! let pipeline = ForecastPipeline::new(SyntheticSource::default(), start);
//!
//! let outcome = pipeline.run("AAPL")?;
//! println!("RMSE {}", outcome.score);
//! for point in outcome.forecast.points() {
//!     println!("{} {:.2}", point.date, point.price);
//! }
//! # Ok::<(), price_forecast::ForecastError>(())
//! ```

pub mod data;
pub mod error;
pub mod evaluation;
pub mod models;
pub mod pipeline;
pub mod scaler;
pub mod source;
pub mod stationarity;
pub mod utils;

// Re-export commonly used types
pub use crate::data::{DataLoader, OhlcBar, OhlcSeries, PricePoint, PriceSeries};
pub use crate::error::ForecastError;
pub use crate::evaluation::{AccuracyScore, Evaluator, HOLDOUT_WINDOW};
pub use crate::models::{ForecastModel, ForecastPoint, ForecastResult, TrainedForecastModel};
pub use crate::pipeline::{ForecastOutcome, ForecastPipeline, FORECAST_HORIZON};
pub use crate::scaler::{fit_scale, inverse_scale, ScaledSeries, ScalerState};
pub use crate::source::{DateRange, PriceSource};
pub use crate::stationarity::{StationarityAnalyzer, SIGNIFICANCE};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
