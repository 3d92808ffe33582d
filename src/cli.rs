//! Command-line arguments
//!
//! ```bash
//! # forecast from Yahoo Finance and write forecast.html
//! close-forecast AAPL
//!
//! # offline, from ./data/TSLA.csv, printing JSON
//! close-forecast TSLA --source csv --csv-dir data --json
//! ```

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 30-day closing price forecast with a candlestick chart
#[derive(Debug, Parser)]
#[command(name = "close-forecast", author, version, about)]
pub struct Cli {
    /// Ticker symbol, e.g. AAPL
    pub ticker: String,

    /// TOML configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Price data source
    #[arg(long, value_enum)]
    pub source: Option<SourceKind>,

    /// First day of price history (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub start_date: Option<NaiveDate>,

    /// Directory holding <TICKER>.csv files
    #[arg(long, value_name = "DIR")]
    pub csv_dir: Option<PathBuf>,

    /// Months of candlesticks on the chart
    #[arg(long, value_name = "MONTHS")]
    pub chart_months: Option<u32>,

    /// Forecast as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub as_of: Option<NaiveDate>,

    /// Chart output path
    #[arg(long, short, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Skip writing the chart
    #[arg(long)]
    pub no_chart: bool,

    /// Print the outcome as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Debug logging, overriding both the config file and `RUST_LOG`
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Yahoo,
    Csv,
    Synthetic,
}
