//! Daily price data: closing-price series and OHLC bars

use crate::error::{ForecastError, Result};
use chrono::NaiveDate;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// One closing price on one calendar day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Chronologically ordered closing prices with unique dates
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    ticker: String,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting empty, unordered, duplicated or non-finite data.
    pub fn new(ticker: impl Into<String>, points: Vec<PricePoint>) -> Result<Self> {
        let ticker = ticker.into();
        if points.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "No closing prices for {}",
                ticker
            )));
        }
        if let Some(point) = points.iter().find(|p| !p.close.is_finite()) {
            return Err(ForecastError::DataUnavailable(format!(
                "Non-finite closing price for {} on {}",
                ticker, point.date
            )));
        }
        if let Some(pair) = points.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataUnavailable(format!(
                "Prices for {} are not strictly chronological at {}",
                ticker, pair[1].date
            )));
        }

        Ok(Self { ticker, points })
    }

    /// Series on consecutive calendar days starting at `start`
    pub fn from_values(
        ticker: impl Into<String>,
        start: NaiveDate,
        values: &[f64],
    ) -> Result<Self> {
        let points = start
            .iter_days()
            .zip(values)
            .map(|(date, &close)| PricePoint { date, close })
            .collect();
        Self::new(ticker, points)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Closing prices in date order
    pub fn closes(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.close).collect()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.points.iter().map(|p| p.date).collect()
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Trailing rolling mean dated at the end of each window
    pub fn rolling_mean(&self, window: usize) -> Result<PriceSeries> {
        let means = trade_math::stats::rolling_mean(&self.closes(), window)?;
        if means.is_empty() {
            return Err(ForecastError::InsufficientData(format!(
                "Rolling window of {} exceeds {} observations",
                window,
                self.len()
            )));
        }
        let points = self.points[self.points.len() - means.len()..]
            .iter()
            .zip(means)
            .map(|(p, close)| PricePoint {
                date: p.date,
                close,
            })
            .collect();
        Self::new(self.ticker.clone(), points)
    }
}

/// Daily open/high/low/close bar
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OhlcBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<u64>,
}

impl OhlcBar {
    fn is_valid(&self) -> bool {
        [self.open, self.high, self.low, self.close]
            .iter()
            .all(|v| v.is_finite())
            && self.low <= self.high
    }
}

/// Chronologically ordered OHLC bars for one ticker
#[derive(Debug, Clone, PartialEq)]
pub struct OhlcSeries {
    ticker: String,
    bars: Vec<OhlcBar>,
}

impl OhlcSeries {
    /// Build a bar series, rejecting empty, unordered or malformed data.
    pub fn new(ticker: impl Into<String>, bars: Vec<OhlcBar>) -> Result<Self> {
        let ticker = ticker.into();
        if bars.is_empty() {
            return Err(ForecastError::DataUnavailable(format!(
                "No price bars for {}",
                ticker
            )));
        }
        if let Some(bar) = bars.iter().find(|b| !b.is_valid()) {
            return Err(ForecastError::DataUnavailable(format!(
                "Malformed bar for {} on {}",
                ticker, bar.date
            )));
        }
        if let Some(pair) = bars.windows(2).find(|w| w[1].date <= w[0].date) {
            return Err(ForecastError::DataUnavailable(format!(
                "Bars for {} are not strictly chronological at {}",
                ticker, pair[1].date
            )));
        }

        Ok(Self { ticker, bars })
    }

    /// Sort by date and keep the last bar for any repeated date before
    /// validating. Sources that scrape or read files go through here.
    pub fn from_unordered(ticker: impl Into<String>, mut bars: Vec<OhlcBar>) -> Result<Self> {
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<OhlcBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self::new(ticker, deduped)
    }

    pub fn ticker(&self) -> &str {
        &self.ticker
    }

    pub fn bars(&self) -> &[OhlcBar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Bars dated within `[start, end]`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<OhlcSeries> {
        let bars = self
            .bars
            .iter()
            .filter(|b| b.date >= start && b.date <= end)
            .copied()
            .collect();
        Self::new(self.ticker.clone(), bars)
    }

    /// The closing prices of these bars
    pub fn close_series(&self) -> Result<PriceSeries> {
        let points = self
            .bars
            .iter()
            .map(|b| PricePoint {
                date: b.date,
                close: b.close,
            })
            .collect();
        PriceSeries::new(self.ticker.clone(), points)
    }
}

/// Data loader for daily price files
#[derive(Debug)]
pub struct DataLoader;

impl DataLoader {
    /// Load OHLC bars from a CSV file with a header row.
    ///
    /// Columns are matched by name: one containing "date" or "time", and
    /// ones containing "open", "high", "low" and "close" (or "price" when
    /// there is no close column). Missing open/high/low fall back to close.
    /// Rows with an empty or unparsable close are skipped.
    pub fn from_csv<P: AsRef<Path>>(path: P, ticker: &str) -> Result<OhlcSeries> {
        let file = File::open(path.as_ref())?;
        let df = CsvReader::new(file)
            .infer_schema(None)
            .has_header(true)
            .finish()?;

        debug!(
            path = %path.as_ref().display(),
            rows = df.height(),
            "read price file"
        );
        Self::from_dataframe(&df, ticker)
    }

    /// Build bars from an existing DataFrame
    pub fn from_dataframe(df: &DataFrame, ticker: &str) -> Result<OhlcSeries> {
        let time_column = Self::detect_column(df, &["date", "time"]).ok_or_else(|| {
            ForecastError::DataUnavailable("No date column found in data".to_string())
        })?;
        let close_column = Self::detect_column(df, &["close"])
            .or_else(|| Self::detect_column(df, &["price"]))
            .ok_or_else(|| {
                ForecastError::DataUnavailable("No close column found in data".to_string())
            })?;

        let dates = Self::column_as_dates(df, &time_column)?;
        let closes = Self::column_as_f64(df, &close_column)?;
        let opens = Self::optional_f64(df, "open")?;
        let highs = Self::optional_f64(df, "high")?;
        let lows = Self::optional_f64(df, "low")?;
        let volumes = Self::optional_f64(df, "volume")?;

        let mut bars = Vec::with_capacity(dates.len());
        for (i, (date, close)) in dates.into_iter().zip(closes).enumerate() {
            let (Some(date), Some(close)) = (date, close) else {
                continue;
            };
            let pick = |column: &Option<Vec<Option<f64>>>| {
                column
                    .as_ref()
                    .and_then(|values| values.get(i).copied().flatten())
                    .unwrap_or(close)
            };
            bars.push(OhlcBar {
                date,
                open: pick(&opens),
                high: pick(&highs),
                low: pick(&lows),
                close,
                volume: volumes
                    .as_ref()
                    .and_then(|values| values.get(i).copied().flatten())
                    .filter(|v| *v >= 0.0)
                    .map(|v| v as u64),
            });
        }

        OhlcSeries::from_unordered(ticker, bars)
    }

    /// First column whose lowercased name contains any of `needles`
    fn detect_column(df: &DataFrame, needles: &[&str]) -> Option<String> {
        df.get_column_names()
            .into_iter()
            .find(|name| {
                let lower = name.to_lowercase();
                needles.iter().any(|needle| lower.contains(needle))
            })
            .map(|name| name.to_string())
    }

    fn optional_f64(df: &DataFrame, needle: &str) -> Result<Option<Vec<Option<f64>>>> {
        match Self::detect_column(df, &[needle]) {
            Some(name) => Ok(Some(Self::column_as_f64(df, &name)?)),
            None => Ok(None),
        }
    }

    /// Column values as f64; nulls and unparsable text become `None`
    fn column_as_f64(df: &DataFrame, column_name: &str) -> Result<Vec<Option<f64>>> {
        let casted = df.column(column_name)?.cast(&DataType::Float64)?;
        Ok(casted.f64()?.into_iter().collect())
    }

    /// Column values as dates; accepts `YYYY-MM-DD` with an optional time suffix
    fn column_as_dates(df: &DataFrame, column_name: &str) -> Result<Vec<Option<NaiveDate>>> {
        let casted = df.column(column_name)?.cast(&DataType::Utf8)?;
        Ok(casted
            .utf8()?
            .into_iter()
            .map(|value| value.and_then(parse_date))
            .collect())
    }
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let day = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_price_series_validation() {
        let ok = PriceSeries::from_values("AAPL", date(2024, 1, 1), &[1.0, 2.0, 3.0]).unwrap();
        assert_eq!(ok.len(), 3);
        assert_eq!(ok.last_date(), Some(date(2024, 1, 3)));

        let empty = PriceSeries::new("AAPL", Vec::new());
        assert!(matches!(empty, Err(ForecastError::DataUnavailable(_))));

        let duplicated = PriceSeries::new(
            "AAPL",
            vec![
                PricePoint {
                    date: date(2024, 1, 1),
                    close: 1.0,
                },
                PricePoint {
                    date: date(2024, 1, 1),
                    close: 2.0,
                },
            ],
        );
        assert!(duplicated.is_err());

        let nan = PriceSeries::from_values("AAPL", date(2024, 1, 1), &[1.0, f64::NAN]);
        assert!(nan.is_err());
    }

    #[test]
    fn test_rolling_mean_dates_align_with_window_end() {
        let values: Vec<f64> = (1..=10).map(f64::from).collect();
        let series = PriceSeries::from_values("MSFT", date(2024, 3, 1), &values).unwrap();

        let rolled = series.rolling_mean(7).unwrap();
        assert_eq!(rolled.len(), 4);
        assert_eq!(rolled.points()[0].date, date(2024, 3, 7));
        assert_eq!(rolled.points()[0].close, 4.0);
        assert_eq!(rolled.last_date(), series.last_date());
    }

    #[test]
    fn test_from_unordered_sorts_and_keeps_last_duplicate() {
        let bar = |d: u32, close: f64| OhlcBar {
            date: date(2024, 1, d),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: None,
        };
        let series =
            OhlcSeries::from_unordered("TSLA", vec![bar(3, 3.0), bar(1, 1.0), bar(3, 30.0)])
                .unwrap();

        let closes: Vec<f64> = series.bars().iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 30.0]);
        assert_eq!(series.close_series().unwrap().closes(), vec![1.0, 30.0]);
    }

    #[test]
    fn test_between_filters_dates() {
        let bars = (1..=5)
            .map(|d| OhlcBar {
                date: date(2024, 2, d),
                open: 1.0,
                high: 2.0,
                low: 0.5,
                close: 1.5,
                volume: Some(10),
            })
            .collect();
        let series = OhlcSeries::new("IBM", bars).unwrap();

        let window = series.between(date(2024, 2, 2), date(2024, 2, 4)).unwrap();
        assert_eq!(window.len(), 3);
        assert!(series.between(date(2025, 1, 1), date(2025, 2, 1)).is_err());
    }

    #[test]
    fn test_malformed_bar_rejected() {
        let bar = OhlcBar {
            date: date(2024, 1, 1),
            open: 1.0,
            high: 0.5,
            low: 2.0,
            close: 1.0,
            volume: None,
        };
        assert!(OhlcSeries::new("X", vec![bar]).is_err());
    }

    #[test]
    fn test_parse_date_accepts_timestamps() {
        assert_eq!(parse_date("2024-05-01"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("2024-05-01 00:00:00-04:00"), Some(date(2024, 5, 1)));
        assert_eq!(parse_date("not a date"), None);
    }
}
