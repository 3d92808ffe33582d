//! Daily bars from the public Yahoo Finance chart endpoint

use super::{normalize_ticker, DateRange, PriceSource};
use crate::data::{OhlcBar, OhlcSeries};
use crate::error::{ForecastError, Result};
use chrono::{DateTime, NaiveDate, NaiveTime};
use reqwest::blocking::Client;
use reqwest::Url;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) price-forecast/0.2";

/// Blocking client for `/v8/finance/chart/<ticker>`
#[derive(Debug, Clone)]
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new(timeout: Duration) -> Result<Self> {
        Self::with_base_url(DEFAULT_BASE_URL, timeout)
    }

    /// Point the source at another host, e.g. a local mirror
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    fn chart_url(&self, ticker: &str, range: &DateRange) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| {
            ForecastError::DataUnavailable(format!("Invalid base url {}: {}", self.base_url, e))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                ForecastError::DataUnavailable(format!(
                    "Base url {} cannot hold a path",
                    self.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);

        // period2 is exclusive, so ask for the end of the last day
        let period1 = unix_seconds(range.start);
        let period2 = unix_seconds(range.end) + 86_400;
        url.query_pairs_mut()
            .append_pair("period1", &period1.to_string())
            .append_pair("period2", &period2.to_string())
            .append_pair("interval", "1d")
            .append_pair("events", "history");
        Ok(url)
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &str {
        "yahoo"
    }

    fn ohlc_bars(&self, ticker: &str, range: &DateRange) -> Result<OhlcSeries> {
        let ticker = normalize_ticker(ticker)?;
        let url = self.chart_url(&ticker, range)?;
        debug!(ticker = %ticker, %url, "requesting yahoo chart");

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            warn!(ticker = %ticker, status = status.as_u16(), "yahoo chart request failed");
            return Err(ForecastError::DataUnavailable(format!(
                "Yahoo returned status {} for {}",
                status.as_u16(),
                ticker
            )));
        }

        let body = response.text()?;
        let series = parse_chart(&ticker, &body)?;
        series.between(range.start, range.end)
    }
}

fn unix_seconds(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResponse {
    chart: YahooChartData,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartData {
    #[serde(default)]
    result: Option<Vec<YahooChartResult>>,
    #[serde(default)]
    error: Option<YahooChartError>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartError {
    code: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartResult {
    #[serde(default)]
    meta: YahooChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: YahooChartIndicators,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct YahooChartMeta {
    /// Exchange offset from UTC in seconds
    #[serde(default)]
    gmtoffset: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartIndicators {
    quote: Vec<YahooChartQuote>,
}

#[derive(Debug, Clone, Deserialize)]
struct YahooChartQuote {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<i64>>,
}

/// Decode a chart payload. Bars with a null close are skipped; missing
/// open/high/low fall back to the close.
pub(crate) fn parse_chart(ticker: &str, body: &str) -> Result<OhlcSeries> {
    let response: YahooChartResponse = serde_json::from_str(body).map_err(|e| {
        ForecastError::DataUnavailable(format!("Malformed chart payload for {}: {}", ticker, e))
    })?;

    if let Some(error) = response.chart.error {
        return Err(ForecastError::DataUnavailable(format!(
            "{} ({}): {}",
            ticker, error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| ForecastError::DataUnavailable(format!("No chart data for {}", ticker)))?;
    let timestamps = result.timestamp.unwrap_or_default();
    let offset = result.meta.gmtoffset.unwrap_or(0);
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ForecastError::DataUnavailable(format!("No quotes for {}", ticker)))?;

    let bars = timestamps
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            // session timestamps are UTC; the bar belongs to the exchange's local day
            let date = DateTime::from_timestamp(ts.checked_add(offset)?, 0)?.date_naive();
            let close = value_at(&quote.close, i)?;
            Some(OhlcBar {
                date,
                open: value_at(&quote.open, i).unwrap_or(close),
                high: value_at(&quote.high, i).unwrap_or(close),
                low: value_at(&quote.low, i).unwrap_or(close),
                close,
                volume: quote
                    .volume
                    .get(i)
                    .copied()
                    .flatten()
                    .and_then(|v| u64::try_from(v).ok()),
            })
        })
        .collect();

    OhlcSeries::from_unordered(ticker, bars)
}

fn value_at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}
