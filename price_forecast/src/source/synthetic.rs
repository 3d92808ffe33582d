//! Offline price source: a seeded geometric random walk per ticker

use super::{normalize_ticker, DateRange, PriceSource};
use crate::data::{OhlcBar, OhlcSeries};
use crate::error::{ForecastError, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// First business day every synthetic history starts from
const EPOCH: (i32, u32, u32) = (2015, 1, 1);

/// Deterministic daily bars on weekdays. The same ticker always yields the
/// same history, so any range is a window onto one fixed path.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    drift: f64,
    volatility: f64,
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self {
            drift: 0.0003,
            volatility: 0.015,
        }
    }
}

impl SyntheticSource {
    pub fn new(drift: f64, volatility: f64) -> Result<Self> {
        if !drift.is_finite() || !(volatility > 0.0 && volatility.is_finite()) {
            return Err(ForecastError::InvalidParameter(format!(
                "Synthetic walk needs finite drift and positive volatility, got {} and {}",
                drift, volatility
            )));
        }
        Ok(Self { drift, volatility })
    }

    fn seed_for(ticker: &str) -> u64 {
        // FNV-1a
        ticker.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, byte| {
            (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
        })
    }

    fn generate(&self, ticker: &str, end: NaiveDate) -> Result<Vec<OhlcBar>> {
        let epoch = NaiveDate::from_ymd_opt(EPOCH.0, EPOCH.1, EPOCH.2)
            .ok_or_else(|| ForecastError::InvalidParameter("Invalid synthetic epoch".to_string()))?;
        let returns = Normal::new(self.drift, self.volatility)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;
        let wicks = Normal::new(0.0, self.volatility / 3.0)
            .map_err(|e| ForecastError::InvalidParameter(e.to_string()))?;

        let seed = Self::seed_for(ticker);
        let mut rng = StdRng::seed_from_u64(seed);
        let mut close = 20.0 + (seed % 480) as f64;

        let bars = epoch
            .iter_days()
            .take_while(|date| *date <= end)
            .filter(|date| !matches!(date.weekday(), Weekday::Sat | Weekday::Sun))
            .map(|date| {
                let open = close;
                close = open * returns.sample(&mut rng).exp();
                let high = open.max(close) * (1.0 + wicks.sample(&mut rng).abs());
                let low = open.min(close) * (1.0 - wicks.sample(&mut rng).abs()).max(0.5);
                OhlcBar {
                    date,
                    open,
                    high,
                    low,
                    close,
                    volume: Some(rng.gen_range(500_000..5_000_000)),
                }
            })
            .collect();
        Ok(bars)
    }
}

impl PriceSource for SyntheticSource {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn ohlc_bars(&self, ticker: &str, range: &DateRange) -> Result<OhlcSeries> {
        let ticker = normalize_ticker(ticker)?;
        let bars: Vec<OhlcBar> = self
            .generate(&ticker, range.end)?
            .into_iter()
            .filter(|bar| range.contains(bar.date))
            .collect();
        debug!(ticker = %ticker, bars = bars.len(), "generated synthetic history");
        OhlcSeries::new(ticker, bars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: (i32, u32, u32), end: (i32, u32, u32)) -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(start.0, start.1, start.2).unwrap(),
            NaiveDate::from_ymd_opt(end.0, end.1, end.2).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_same_ticker_same_path() {
        let source = SyntheticSource::default();
        let window = range((2024, 1, 1), (2024, 3, 31));

        let a = source.close_prices("aapl", &window).unwrap();
        let b = source.close_prices("AAPL", &window).unwrap();
        let c = source.close_prices("TSLA", &window).unwrap();

        assert_eq!(a, b);
        assert_ne!(a.closes(), c.closes());
    }

    #[test]
    fn test_windows_share_one_history() {
        let source = SyntheticSource::default();
        let long = source.close_prices("MSFT", &range((2024, 1, 1), (2024, 6, 30))).unwrap();
        let short = source.close_prices("MSFT", &range((2024, 3, 1), (2024, 3, 31))).unwrap();

        let first = short.points()[0];
        assert!(long.points().contains(&first));
    }

    #[test]
    fn test_weekdays_only_and_bars_consistent() {
        let source = SyntheticSource::default();
        let bars = source.ohlc_bars("IBM", &range((2024, 1, 1), (2024, 2, 29))).unwrap();

        assert!(!bars.is_empty());
        for bar in bars.bars() {
            assert!(!matches!(bar.date.weekday(), Weekday::Sat | Weekday::Sun));
            assert!(bar.low <= bar.open.min(bar.close));
            assert!(bar.high >= bar.open.max(bar.close));
            assert!(bar.low > 0.0);
        }
    }

    #[test]
    fn test_range_before_epoch_is_unavailable() {
        let source = SyntheticSource::default();
        let result = source.close_prices("AAPL", &range((2010, 1, 1), (2010, 12, 31)));
        assert!(matches!(result, Err(ForecastError::DataUnavailable(_))));
    }

    #[test]
    fn test_invalid_volatility_rejected() {
        assert!(SyntheticSource::new(0.0, 0.0).is_err());
        assert!(SyntheticSource::new(f64::NAN, 0.01).is_err());
    }
}
