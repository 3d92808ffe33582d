//! Wires configuration, a price source, the forecast pipeline and the chart

use crate::chart::{error_page, forecast_figure, forecast_page};
use crate::cli::{Cli, SourceKind};
use crate::config::AppConfig;
use crate::error::AppError;
use chrono::{Local, NaiveDate};
use price_forecast::source::{CsvSource, SyntheticSource, YahooSource};
use price_forecast::{
    DateRange, ForecastError, ForecastOutcome, ForecastPipeline, OhlcSeries, PriceSource,
};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::time::Duration;
use tracing::{info, warn};

pub fn build_source(config: &AppConfig) -> Result<Box<dyn PriceSource>, ForecastError> {
    let source: Box<dyn PriceSource> = match config.source.kind {
        SourceKind::Yahoo => Box::new(YahooSource::new(Duration::from_secs(
            config.source.timeout_secs,
        ))?),
        SourceKind::Csv => Box::new(CsvSource::new(&config.source.csv_dir)),
        SourceKind::Synthetic => Box::new(SyntheticSource::default()),
    };
    Ok(source)
}

/// Run one forecast. Any failure is returned whole; nothing partial is
/// written except the error page.
pub fn run(cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    let today = cli.as_of.unwrap_or_else(|| Local::now().date_naive());
    let chart_path = (!cli.no_chart).then_some(config.output.chart_path.as_path());

    match forecast(&cli.ticker, config, today) {
        Ok(report) => {
            if let Some(path) = chart_path {
                let outcome = &report.outcome;
                let figure = forecast_figure(&outcome.ticker, &report.history, &outcome.forecast);
                fs::write(path, forecast_page(&outcome.ticker, outcome.score, &figure))?;
                info!(path = %path.display(), "wrote chart");
            }
            print_outcome(&report.outcome, cli.json)
        }
        Err(err) => {
            if let Some(path) = chart_path {
                write_error_page(path, &err);
            }
            Err(err)
        }
    }
}

struct Report {
    outcome: ForecastOutcome,
    history: OhlcSeries,
}

fn forecast(ticker: &str, config: &AppConfig, today: NaiveDate) -> Result<Report, AppError> {
    let wrap = |err: ForecastError| AppError::forecast(ticker.trim(), err);

    let source = build_source(config).map_err(wrap)?;
    let pipeline = ForecastPipeline::new(source, config.source.start_date);
    let outcome = pipeline.run_as_of(ticker, today).map_err(wrap)?;

    let chart_range =
        DateRange::trailing_months(today, config.source.chart_months).map_err(wrap)?;
    let history = pipeline
        .source()
        .ohlc_bars(&outcome.ticker, &chart_range)
        .map_err(wrap)?;

    Ok(Report { outcome, history })
}

fn write_error_page(path: &Path, err: &AppError) {
    if let Err(io_err) = fs::write(path, error_page(&err.user_message())) {
        warn!(path = %path.display(), error = %io_err, "could not write error page");
    }
}

fn print_outcome(outcome: &ForecastOutcome, json: bool) -> Result<(), AppError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if json {
        serde_json::to_writer_pretty(&mut out, outcome)?;
        writeln!(out)?;
        return Ok(());
    }

    writeln!(
        out,
        "{}  d={}  RMSE={}",
        outcome.ticker, outcome.differencing_order, outcome.score
    )?;
    for point in outcome.forecast.points() {
        writeln!(out, "{}  {:>10.2}", point.date, point.price)?;
    }
    Ok(())
}
