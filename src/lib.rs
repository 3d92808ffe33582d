//! # Close Forecast
//!
//! Command-line front end for `price_forecast`: reads configuration, fetches
//! daily prices, runs the 30-day forecast and writes a candlestick chart with
//! the forecast overlaid.

pub mod app;
pub mod chart;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;

pub use crate::cli::Cli;
pub use crate::config::AppConfig;
pub use crate::error::AppError;
