use price_forecast::ForecastError;
use thiserror::Error;

const TICKER_HINT: &str = "Please try a valid stock ticker like 'AAPL' or 'TSLA'.";

/// Application-level failures
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{ticker}: {source}")]
    Forecast {
        ticker: String,
        #[source]
        source: ForecastError,
    },

    #[error("config error: {0}")]
    Config(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn forecast(ticker: impl Into<String>, source: ForecastError) -> Self {
        Self::Forecast {
            ticker: ticker.into(),
            source,
        }
    }

    /// The single line shown to the user
    pub fn user_message(&self) -> String {
        match self {
            Self::Forecast { ticker, source } => format!(
                "Error: could not forecast '{}': {}. {}",
                ticker,
                source.to_string().trim_end_matches('.'),
                TICKER_HINT
            ),
            other => format!("Error: {}", other),
        }
    }

    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::Forecast { .. } => 3,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
