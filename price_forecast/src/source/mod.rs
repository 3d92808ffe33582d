//! Price data sources
//!
//! A [`PriceSource`] turns a ticker and a date range into daily bars. Every
//! failure a source can hit is reported as
//! [`ForecastError::DataUnavailable`](crate::error::ForecastError::DataUnavailable).

use crate::data::{OhlcSeries, PriceSeries};
use crate::error::{ForecastError, Result};
use chrono::{Months, NaiveDate};

pub mod csv;
pub mod synthetic;
pub mod yahoo;

pub use self::csv::CsvSource;
pub use self::synthetic::SyntheticSource;
pub use self::yahoo::YahooSource;

/// Inclusive range of calendar days
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(ForecastError::InvalidParameter(format!(
                "Range start {} is after end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// The `months` calendar months ending at `end`
    pub fn trailing_months(end: NaiveDate, months: u32) -> Result<Self> {
        let start = end.checked_sub_months(Months::new(months)).ok_or_else(|| {
            ForecastError::InvalidParameter(format!(
                "Cannot go back {} months from {}",
                months, end
            ))
        })?;
        Self::new(start, end)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

/// Where daily prices come from
pub trait PriceSource {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Daily bars for `ticker` within `range`
    fn ohlc_bars(&self, ticker: &str, range: &DateRange) -> Result<OhlcSeries>;

    /// Daily closing prices for `ticker` within `range`
    fn close_prices(&self, ticker: &str, range: &DateRange) -> Result<PriceSeries> {
        self.ohlc_bars(ticker, range)?.close_series()
    }
}

impl<S: PriceSource + ?Sized> PriceSource for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn ohlc_bars(&self, ticker: &str, range: &DateRange) -> Result<OhlcSeries> {
        (**self).ohlc_bars(ticker, range)
    }

    fn close_prices(&self, ticker: &str, range: &DateRange) -> Result<PriceSeries> {
        (**self).close_prices(ticker, range)
    }
}

/// Trim and upper-case a ticker, rejecting anything that is not a plausible
/// exchange symbol (letters, digits and `.-^=`).
pub fn normalize_ticker(raw: &str) -> Result<String> {
    let ticker = raw.trim().to_ascii_uppercase();
    let valid = !ticker.is_empty()
        && ticker.len() <= 16
        && ticker
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
    if !valid {
        return Err(ForecastError::DataUnavailable(format!(
            "'{}' is not a valid ticker symbol",
            raw.trim()
        )));
    }
    Ok(ticker)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(" aapl ", "AAPL")]
    #[case("brk-b", "BRK-B")]
    #[case("^gspc", "^GSPC")]
    #[case("eurusd=x", "EURUSD=X")]
    fn test_normalize_ticker(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_ticker(raw).unwrap(), expected);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("AA PL")]
    #[case("../etc/passwd")]
    fn test_normalize_ticker_rejects(#[case] raw: &str) {
        assert!(matches!(
            normalize_ticker(raw),
            Err(ForecastError::DataUnavailable(_))
        ));
    }

    #[test]
    fn test_trailing_months() {
        let end = NaiveDate::from_ymd_opt(2024, 8, 31).unwrap();
        let range = DateRange::trailing_months(end, 6).unwrap();
        assert_eq!(range.start, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        assert!(range.contains(end));
        assert!(!range.contains(NaiveDate::from_ymd_opt(2024, 2, 28).unwrap()));
    }

    #[test]
    fn test_reversed_range_rejected() {
        let a = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let b = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(DateRange::new(a, b).is_err());
    }
}
