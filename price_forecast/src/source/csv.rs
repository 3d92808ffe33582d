//! Price files on local disk, one `<TICKER>.csv` per symbol

use super::{normalize_ticker, DateRange, PriceSource};
use crate::data::{DataLoader, OhlcSeries};
use crate::error::{ForecastError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads `<dir>/<TICKER>.csv` through [`DataLoader`]
#[derive(Debug, Clone)]
pub struct CsvSource {
    dir: PathBuf,
}

impl CsvSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker))
    }
}

impl PriceSource for CsvSource {
    fn name(&self) -> &str {
        "csv"
    }

    fn ohlc_bars(&self, ticker: &str, range: &DateRange) -> Result<OhlcSeries> {
        let ticker = normalize_ticker(ticker)?;
        let path = self.path_for(&ticker);
        if !path.is_file() {
            return Err(ForecastError::DataUnavailable(format!(
                "No price file for {} at {}",
                ticker,
                path.display()
            )));
        }

        let all = DataLoader::from_csv(&path, &ticker)?;
        debug!(ticker = %ticker, bars = all.len(), "loaded csv history");
        all.between(range.start, range.end)
    }
}
